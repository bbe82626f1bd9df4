use crate::error::Result;
use crate::ops::utils::{check_finite, check_norm, check_weights, view_from_raw, Layout};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Largest absolute entry of each row.
/// x: A 2D array of shape (nrows, ncols).
/// Returns a 1D array of shape (nrows,); a zero-width row has maximum 0.
pub fn row_maxima(x: &ArrayView2<f64>) -> Array1<f64> {
    x.map_axis(Axis(1), |row| row.iter().fold(0.0, |m: f64, v| m.max(v.abs())))
}

/// `Σ_i w_i · m_i` for precomputed row maxima, summed in row order.
pub(crate) fn weighted_sum(maxima: &ArrayView1<f64>, weights: &ArrayView1<f64>) -> f64 {
    maxima
        .iter()
        .zip(weights.iter())
        .fold(0.0, |acc, (m, w)| acc + w * m)
}

/// Weighted row-max (L1,inf) norm: `Σ_i w_i · max_j |x_ij|`.
pub fn weighted_row_max_norm(x: &ArrayView2<f64>, weights: &ArrayView1<f64>) -> Result<f64> {
    check_weights(weights, x.nrows())?;
    check_finite(x)?;
    check_norm(weighted_sum(&row_maxima(x).view(), weights))
}

/// Flat-buffer variant of [`weighted_row_max_norm`].
pub fn weighted_row_max_norm_raw(
    data: &[f64],
    nrows: usize,
    ncols: usize,
    layout: Layout,
    weights: &[f64],
) -> Result<f64> {
    let x = view_from_raw(data, nrows, ncols, layout)?;
    weighted_row_max_norm(&x, &ArrayView1::from(weights))
}
