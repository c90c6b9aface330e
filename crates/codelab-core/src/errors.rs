//! Error types for the execution service.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ExecError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to spawn interpreter: {0}")]
    Spawn(String),
    #[error("Execution timed out after {0} ms")]
    Timeout(u64),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ExecError {
    fn from(err: std::io::Error) -> Self {
        ExecError::Io(err.to_string())
    }
}
