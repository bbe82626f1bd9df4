use crate::config::ProjectionConfig;
use crate::ops::{project_with_config, resolve_thresholds, weighted_row_max_norm};
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;


pub(crate) const FRACTIONS: [f64; 9] = [0.01, 0.05, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];

pub(crate) fn random_matrix(nrows: usize, ncols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::random_using((nrows, ncols), Uniform::new(-1.0, 1.0), &mut rng)
}

pub(crate) fn random_weights(nrows: usize, seed: u64) -> Array1<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array1::random_using(nrows, Uniform::new(0.0, 2.0), &mut rng)
}

/// Projection plus its thresholds, for tests that look at both.
pub(crate) fn project_and_caps(
    a: &Array2<f64>,
    radius: f64,
    w: &Array1<f64>,
) -> (Array2<f64>, Array1<f64>) {
    let config = ProjectionConfig::default();
    let b = project_with_config(&a.view(), radius, &w.view(), &config).unwrap();
    let caps = resolve_thresholds(&a.view(), radius, &w.view(), &config).unwrap();
    (b, caps)
}

pub(crate) fn norm(a: &Array2<f64>, w: &Array1<f64>) -> f64 {
    weighted_row_max_norm(&a.view(), &w.view()).unwrap()
}
