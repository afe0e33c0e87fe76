//! CLI error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] ormguard_core::Error),

    #[error(transparent)]
    Security(#[from] ormguard_core::SecurityError),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("{0}")]
    Usage(String),
}

pub type CliResult<T> = Result<T, CliError>;
