//! Error type for the fallible edges of the lab (configuration loading).
//!
//! The tick path never returns errors: bad references are skipped, bad
//! indices clamped, zero rates treated as zero.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabError {
    #[error("unknown simulation '{0}'")]
    UnknownSimulation(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for configuration and CLI code.
pub type LabResult<T> = Result<T, LabError>;
