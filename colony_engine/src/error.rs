use crate::entities::SpeciesId;
use thiserror::Error;

/// Errors raised at the boundary of the simulation: configuration, layouts and I/O.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A configuration value is outside its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A text layout could not be parsed.
    #[error("invalid layout: {0}")]
    Layout(String),

    /// An operation referred to a species the simulation does not know.
    #[error("unknown {0}")]
    UnknownSpecies(SpeciesId),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
