//! Row-max sparsification: Euclidean projection onto the weighted L1,inf ball
//! `{B : Σ_i w_i · max_j |B_ij| ≤ c}`.

pub mod config;
pub mod error;
pub mod ops;

#[cfg(feature = "python")]
mod bindings;

pub use config::{ProjectionConfig, Solver};
pub use error::{ProjectionError, Result};
pub use ops::{
    project, project_raw, project_with_config, resolve_thresholds, weighted_row_max_norm,
    weighted_row_max_norm_raw, Layout,
};
