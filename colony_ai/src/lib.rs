//! # colony_ai
//!
//! Python bindings for the ant colony simulation engine.

pub mod simulation;
pub use simulation::CellState;
pub use simulation::Simulation;

use pyo3::prelude::*;

#[pymodule]
fn colony_ai(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Simulation>()?;
    m.add_class::<CellState>()?;
    Ok(())
}
