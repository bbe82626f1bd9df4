mod projection;

use pyo3::prelude::*;
use pyo3::types::PyModule;

/// rowmax_sparsify - weighted L1,inf ball projection in Rust
#[pymodule]
pub fn rowmax_sparsify(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    // Norm / projection
    projection::register(m)?;
    Ok(())
}
