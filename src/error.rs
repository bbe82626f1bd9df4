//! Error types for the row-max projection kernels

use thiserror::Error;

/// Result type alias using the crate's error
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Errors raised by the norm and projection operations.
///
/// Everything is checked before any work starts, so a failed call never
/// leaves partial output behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Malformed shape, weight vector, radius or matrix entry
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// The lambda search could not meet the radius within tolerance
    #[error("Projection did not converge after {iterations} iterations (residual {residual:e})")]
    NumericNonConvergence {
        /// Iterations spent before giving up
        iterations: usize,
        /// Distance between the achieved weighted sum and the radius
        residual: f64,
    },
}

impl ProjectionError {
    pub(crate) fn invalid(arg: &'static str, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}
