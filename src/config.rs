/// Strategy used to locate the shared dual variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Solver {
    /// Sort every row breakpoint once and scan them in order.
    #[default]
    Exact,
    /// Bisect lambda until the weighted sum meets the radius.
    Bisection,
}

impl std::str::FromStr for Solver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Solver::Exact),
            "bisection" | "bisect" => Ok(Solver::Bisection),
            other => Err(format!("unknown solver '{}' (expected exact or bisection)", other)),
        }
    }
}

/// 투영 설정
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    pub solver: Solver,
    /// Tolerance on `Σ w_i t_i = c`, scaled by `max(1, c)`.
    pub relative_tolerance: f64,
    /// Bisection step limit.
    pub max_iterations: usize,
    /// Matrices with at least this many entries are processed on the rayon pool.
    pub parallel_min_elements: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            solver: Solver::Exact,
            relative_tolerance: 1e-9,
            max_iterations: 200,
            parallel_min_elements: 1 << 16,
        }
    }
}

impl ProjectionConfig {
    pub fn new(solver: Solver) -> Self {
        Self {
            solver,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, relative_tolerance: f64) -> Self {
        self.relative_tolerance = relative_tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_parallel_min_elements(mut self, parallel_min_elements: usize) -> Self {
        self.parallel_min_elements = parallel_min_elements;
        self
    }

    /// Absolute tolerance for a given radius.
    pub fn tolerance_for(&self, radius: f64) -> f64 {
        self.relative_tolerance * radius.max(1.0)
    }

    pub(crate) fn use_parallel(&self, nrows: usize, ncols: usize) -> bool {
        nrows.saturating_mul(ncols) >= self.parallel_min_elements
    }
}
