use crate::config::ProjectionConfig;
use crate::error::Result;
use crate::ops::norm::{row_maxima, weighted_sum};
use crate::ops::threshold::{solve_thresholds, RowProfile};
use crate::ops::utils::{
    check_finite, check_norm, check_radius, check_weights, view_from_raw, Layout,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

/// Closest point with `|b| ≤ t`: only entries above the cap move, sign kept.
#[inline]
pub fn clip_to_threshold(a: f64, t: f64) -> f64 {
    if a.abs() > t {
        t.copysign(a)
    } else {
        a
    }
}

fn build_profiles(
    x: &ArrayView2<f64>,
    weights: &ArrayView1<f64>,
    parallel: bool,
) -> Vec<RowProfile> {
    if parallel {
        x.axis_iter(Axis(0))
            .into_par_iter()
            .enumerate()
            .map(|(i, row)| RowProfile::new(row, weights[i]))
            .collect()
    } else {
        x.axis_iter(Axis(0))
            .zip(weights.iter())
            .map(|(row, &w)| RowProfile::new(row, w))
            .collect()
    }
}

/// Caps every row of `x` at its threshold.
pub fn clip_rows(x: &ArrayView2<f64>, thresholds: &[f64], parallel: bool) -> Array2<f64> {
    let mut result = x.to_owned();
    if parallel {
        result
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(thresholds.par_iter())
            .for_each(|(mut row, &t)| row.mapv_inplace(|a| clip_to_threshold(a, t)));
    } else {
        for (mut row, &t) in result.axis_iter_mut(Axis(0)).zip(thresholds.iter()) {
            row.mapv_inplace(|a| clip_to_threshold(a, t));
        }
    }
    result
}

/// Validates the inputs and resolves per-row caps.
/// Returns `None` when `x` already lies inside the ball.
fn row_caps(
    x: &ArrayView2<f64>,
    radius: f64,
    weights: &ArrayView1<f64>,
    config: &ProjectionConfig,
) -> Result<Option<Vec<f64>>> {
    check_radius(radius)?;
    check_weights(weights, x.nrows())?;
    check_finite(x)?;

    let norm = check_norm(weighted_sum(&row_maxima(x).view(), weights))?;
    if norm <= radius {
        tracing::debug!(norm, radius, "matrix already inside the ball");
        return Ok(None);
    }

    let (nrows, ncols) = x.dim();
    let parallel = config.use_parallel(nrows, ncols);
    tracing::trace!(nrows, ncols, parallel, norm, radius, "projecting onto row-max ball");

    let profiles = build_profiles(x, weights, parallel);
    let thresholds = solve_thresholds(&profiles, radius, config)?;
    Ok(Some(thresholds.values))
}

/// Per-row caps `t_i` of the projection of `x` at `radius`.
///
/// Rows that are left untouched report their own maximum magnitude.
pub fn resolve_thresholds(
    x: &ArrayView2<f64>,
    radius: f64,
    weights: &ArrayView1<f64>,
    config: &ProjectionConfig,
) -> Result<Array1<f64>> {
    match row_caps(x, radius, weights, config)? {
        Some(caps) => Ok(Array1::from(caps)),
        None => Ok(row_maxima(x)),
    }
}

/// Euclidean projection of `x` onto `{B : Σ_i w_i · max_j |B_ij| ≤ radius}`.
pub fn project(
    x: &ArrayView2<f64>,
    radius: f64,
    weights: &ArrayView1<f64>,
) -> Result<Array2<f64>> {
    project_with_config(x, radius, weights, &ProjectionConfig::default())
}

pub fn project_with_config(
    x: &ArrayView2<f64>,
    radius: f64,
    weights: &ArrayView1<f64>,
    config: &ProjectionConfig,
) -> Result<Array2<f64>> {
    match row_caps(x, radius, weights, config)? {
        Some(caps) => {
            let (nrows, ncols) = x.dim();
            Ok(clip_rows(x, &caps, config.use_parallel(nrows, ncols)))
        }
        None => Ok(x.to_owned()),
    }
}

/// Flat-buffer variant of [`project`]; the result uses the input layout.
pub fn project_raw(
    data: &[f64],
    nrows: usize,
    ncols: usize,
    layout: Layout,
    radius: f64,
    weights: &[f64],
) -> Result<Vec<f64>> {
    let x = view_from_raw(data, nrows, ncols, layout)?;
    let projected = project(&x, radius, &ArrayView1::from(weights))?;
    let flat: Vec<f64> = match layout {
        Layout::RowMajor => projected.iter().copied().collect(),
        Layout::ColumnMajor => projected.t().iter().copied().collect(),
    };
    Ok(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Solver;
    use crate::error::ProjectionError;
    use crate::ops::norm::weighted_row_max_norm;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::{arr1, arr2};

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_single_row_scenario() {
        let a = arr2(&[[5.0, -2.0, 1.0]]);
        let b = project(&a.view(), 2.0, &arr1(&[1.0]).view()).unwrap();
        assert_eq!(b, arr2(&[[2.0, -2.0, 1.0]]));
    }

    #[test]
    fn test_two_row_scenario() {
        let a = arr2(&[[3.0, -4.0], [1.0, 1.0]]);
        let w = arr1(&[1.0, 1.0]);
        assert_eq!(weighted_row_max_norm(&a.view(), &w.view()).unwrap(), 5.0);

        let b = project(&a.view(), 3.0, &w.view()).unwrap();
        assert_relative_eq!(
            weighted_row_max_norm(&b.view(), &w.view()).unwrap(),
            3.0,
            epsilon = EPSILON
        );
        assert_relative_eq!(b, arr2(&[[2.75, -2.75], [0.25, 0.25]]), epsilon = EPSILON);
        // 같은 크기의 원소는 함께 잘림
        assert_eq!(b[[1, 0]], b[[1, 1]]);
    }

    #[test]
    fn test_feasible_input_is_copied() {
        let a = arr2(&[[0.5, -0.25], [0.1, 0.0]]);
        let w = arr1(&[1.0, 2.0]);
        let b = project(&a.view(), 10.0, &w.view()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_radius_zeroes_weighted_rows() {
        let a = arr2(&[[3.0, -4.0], [1.0, 1.0], [-6.0, 2.0]]);
        let w = arr1(&[1.0, 0.5, 0.0]);
        let b = project(&a.view(), 0.0, &w.view()).unwrap();
        assert_eq!(b.row(0), arr1(&[0.0, 0.0]));
        assert_eq!(b.row(1), arr1(&[0.0, 0.0]));
        assert_eq!(b.row(2), a.row(2));
    }

    #[test]
    fn test_zero_weight_row_untouched() {
        let a = arr2(&[[10.0, -20.0], [3.0, 1.0]]);
        let w = arr1(&[0.0, 1.0]);
        let b = project(&a.view(), 1.0, &w.view()).unwrap();
        assert_eq!(b.row(0), a.row(0));
        assert_eq!(b.row(1), arr1(&[1.0, 1.0]));
    }

    #[test]
    fn test_degenerate_shapes() {
        let no_rows = Array2::<f64>::zeros((0, 3));
        let b = project(&no_rows.view(), 0.0, &Array1::<f64>::zeros(0).view()).unwrap();
        assert_eq!(b.dim(), (0, 3));

        let no_cols = Array2::<f64>::zeros((2, 0));
        let b = project(&no_cols.view(), 0.0, &arr1(&[1.0, 1.0]).view()).unwrap();
        assert_eq!(b.dim(), (2, 0));
    }

    #[test]
    fn test_invalid_arguments() {
        let a = arr2(&[[1.0, 2.0]]);
        let w = arr1(&[1.0]);

        let err = project(&a.view(), -0.5, &w.view()).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidArgument { arg: "radius", .. }));

        let err = project(&a.view(), 1.0, &arr1(&[1.0, 1.0]).view()).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidArgument { arg: "weights", .. }));

        let bad = arr2(&[[1.0, f64::INFINITY]]);
        let err = project(&bad.view(), 1.0, &w.view()).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidArgument { arg: "matrix", .. }));
    }

    #[test]
    fn test_resolve_thresholds() {
        let a = arr2(&[[3.0, -4.0], [1.0, 1.0]]);
        let w = arr1(&[1.0, 1.0]);
        let config = ProjectionConfig::default();

        let t = resolve_thresholds(&a.view(), 3.0, &w.view(), &config).unwrap();
        assert_abs_diff_eq!(t, arr1(&[2.75, 0.25]), epsilon = EPSILON);

        let t = resolve_thresholds(&a.view(), 6.0, &w.view(), &config).unwrap();
        assert_eq!(t, arr1(&[4.0, 1.0]));
    }

    #[test]
    fn test_project_raw_keeps_layout() {
        // [[3, -4], [1, 1]]
        let row_major = [3.0, -4.0, 1.0, 1.0];
        let out = project_raw(&row_major, 2, 2, Layout::RowMajor, 3.0, &[1.0, 1.0]).unwrap();
        for (o, e) in out.iter().zip([2.75, -2.75, 0.25, 0.25]) {
            assert_abs_diff_eq!(*o, e, epsilon = EPSILON);
        }

        let col_major = [3.0, 1.0, -4.0, 1.0];
        let out = project_raw(&col_major, 2, 2, Layout::ColumnMajor, 3.0, &[1.0, 1.0]).unwrap();
        for (o, e) in out.iter().zip([2.75, 0.25, -2.75, 0.25]) {
            assert_abs_diff_eq!(*o, e, epsilon = EPSILON);
        }

        assert!(project_raw(&row_major, 3, 2, Layout::RowMajor, 1.0, &[1.0; 3]).is_err());
    }

    #[test]
    fn test_bisection_solver_matches_exact() {
        let a = arr2(&[[0.9, -0.2, 0.4], [0.3, 0.3, -0.3], [1.5, 0.0, -1.4]]);
        let w = arr1(&[1.0, 2.0, 0.5]);
        let exact = project(&a.view(), 0.8, &w.view()).unwrap();
        let bisect =
            project_with_config(&a.view(), 0.8, &w.view(), &ProjectionConfig::new(Solver::Bisection))
                .unwrap();
        assert_abs_diff_eq!(exact, bisect, epsilon = 1e-7);
    }

    #[test]
    fn test_clip_to_threshold() {
        assert_eq!(clip_to_threshold(-3.0, 2.0), -2.0);
        assert_eq!(clip_to_threshold(1.5, 2.0), 1.5);
        assert_eq!(clip_to_threshold(-2.0, 2.0), -2.0);
        assert_eq!(clip_to_threshold(0.7, 0.0), 0.0);
        assert!(clip_to_threshold(-0.0, 0.0).is_sign_negative());
    }

    #[test]
    fn test_overflowing_norm_is_rejected() {
        let a = arr2(&[[1e300, -1.7e308], [1e308, 1.0]]);
        let w = arr1(&[1.0, 1.0]);
        let err = project(&a.view(), 1e308, &w.view()).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidArgument { arg: "matrix", .. }));

        let err = resolve_thresholds(&a.view(), 1e308, &w.view(), &ProjectionConfig::default())
            .unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidArgument { arg: "matrix", .. }));
    }
}
