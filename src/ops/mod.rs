pub mod norm;
pub mod project;
pub mod threshold;
pub mod utils;

#[cfg(test)]
mod __test__;

pub use self::norm::{row_maxima, weighted_row_max_norm, weighted_row_max_norm_raw};
pub use self::project::{
    clip_rows, clip_to_threshold, project, project_raw, project_with_config, resolve_thresholds,
};
pub use self::threshold::{solve_thresholds, RowProfile, Thresholds};
pub use self::utils::{view_from_raw, Layout};
