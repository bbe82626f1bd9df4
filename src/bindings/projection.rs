use crate::config::{ProjectionConfig, Solver};
use crate::error::ProjectionError;
use crate::ops;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::{PyArithmeticError, PyValueError};
use pyo3::prelude::*;

impl From<ProjectionError> for PyErr {
    fn from(err: ProjectionError) -> PyErr {
        match err {
            ProjectionError::InvalidArgument { .. } => PyValueError::new_err(err.to_string()),
            ProjectionError::NumericNonConvergence { .. } => {
                PyArithmeticError::new_err(err.to_string())
            }
        }
    }
}

fn config_for(solver: &str) -> PyResult<ProjectionConfig> {
    let solver: Solver = solver.parse().map_err(PyValueError::new_err)?;
    Ok(ProjectionConfig::new(solver))
}

#[pyfunction]
pub fn weighted_row_max_norm(
    x: PyReadonlyArray2<f64>,
    weights: PyReadonlyArray1<f64>,
) -> PyResult<f64> {
    let x_arr = x.as_array();
    let w_arr = weights.as_array();
    Ok(ops::weighted_row_max_norm(&x_arr, &w_arr)?)
}

#[pyfunction]
#[pyo3(signature = (x, radius, weights, solver = "exact"))]
pub fn project<'py>(
    py: Python<'py>,
    x: PyReadonlyArray2<f64>,
    radius: f64,
    weights: PyReadonlyArray1<f64>,
    solver: &str,
) -> PyResult<&'py PyArray2<f64>> {
    let config = config_for(solver)?;
    let x_arr = x.as_array();
    let w_arr = weights.as_array();
    let result = ops::project_with_config(&x_arr, radius, &w_arr, &config)?;
    Ok(result.into_pyarray(py))
}

#[pyfunction]
#[pyo3(signature = (x, radius, weights, solver = "exact"))]
pub fn row_thresholds<'py>(
    py: Python<'py>,
    x: PyReadonlyArray2<f64>,
    radius: f64,
    weights: PyReadonlyArray1<f64>,
    solver: &str,
) -> PyResult<&'py PyArray1<f64>> {
    let config = config_for(solver)?;
    let x_arr = x.as_array();
    let w_arr = weights.as_array();
    let result = ops::resolve_thresholds(&x_arr, radius, &w_arr, &config)?;
    Ok(result.into_pyarray(py))
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(weighted_row_max_norm, m)?)?;
    m.add_function(wrap_pyfunction!(project, m)?)?;
    m.add_function(wrap_pyfunction!(row_thresholds, m)?)?;
    Ok(())
}
