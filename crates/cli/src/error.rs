//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Argument value outside its accepted range
    #[error("Invalid value for --{name}: {message}")]
    InvalidArgument { name: String, message: String },

    /// Credential document or recipient sheet problem
    #[error("Failed to load inputs: {0}")]
    Input(#[from] contracts::ContractError),

    /// Job could not be started
    #[error("Dispatch could not start: {0}")]
    Dispatch(#[from] dispatcher::DispatchError),

    /// Worker ended without a report
    #[error("Dispatch worker terminated without a report")]
    DispatchAborted,
}

impl CliError {
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
