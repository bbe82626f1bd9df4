use crate::error::{ProjectionError, Result};
use ndarray::{ArrayView1, ArrayView2, ShapeBuilder};

/// Memory order of a flat matrix buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    RowMajor,
    ColumnMajor,
}

/// Wraps a flat buffer as a `nrows x ncols` view, checking the declared
/// shape against the buffer length.
pub fn view_from_raw(
    data: &[f64],
    nrows: usize,
    ncols: usize,
    layout: Layout,
) -> Result<ArrayView2<'_, f64>> {
    let expected = nrows.checked_mul(ncols).ok_or_else(|| {
        ProjectionError::invalid("matrix", format!("{}x{} overflows usize", nrows, ncols))
    })?;
    if data.len() != expected {
        return Err(ProjectionError::invalid(
            "matrix",
            format!(
                "declared shape {}x{} needs {} entries, storage holds {}",
                nrows,
                ncols,
                expected,
                data.len()
            ),
        ));
    }
    let view = match layout {
        Layout::RowMajor => ArrayView2::from_shape((nrows, ncols), data),
        Layout::ColumnMajor => ArrayView2::from_shape((nrows, ncols).f(), data),
    };
    view.map_err(|e| ProjectionError::invalid("matrix", e.to_string()))
}

pub fn check_weights(weights: &ArrayView1<f64>, nrows: usize) -> Result<()> {
    if weights.len() != nrows {
        return Err(ProjectionError::invalid(
            "weights",
            format!("expected {} weights (one per row), got {}", nrows, weights.len()),
        ));
    }
    if let Some((i, w)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(ProjectionError::invalid(
            "weights",
            format!("weight {} must be finite and non-negative, got {}", i, w),
        ));
    }
    Ok(())
}

pub fn check_finite(matrix: &ArrayView2<f64>) -> Result<()> {
    // NaN/inf 은 조용히 전파하지 않고 거부
    if let Some(((i, j), v)) = matrix.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(ProjectionError::invalid(
            "matrix",
            format!("entry ({}, {}) is not finite: {}", i, j, v),
        ));
    }
    Ok(())
}

/// Finite entries can still overflow once weighted and summed.
pub fn check_norm(norm: f64) -> Result<f64> {
    if !norm.is_finite() {
        return Err(ProjectionError::invalid(
            "matrix",
            format!("weighted row-max norm overflows: {}", norm),
        ));
    }
    Ok(norm)
}

pub fn check_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(ProjectionError::invalid(
            "radius",
            format!("must be finite and non-negative, got {}", radius),
        ));
    }
    Ok(())
}
