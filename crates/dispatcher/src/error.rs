//! Dispatcher error types

use thiserror::Error;

/// Reasons a job cannot start
///
/// Per-recipient delivery failures are not errors at this level; they are
/// counted by the engine and the job continues.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Credential list is empty
    #[error("no delivery credentials configured")]
    NoCredentials,

    /// Recipient source has no rows
    #[error("recipient source contains no rows")]
    EmptySource,

    /// Credential store or recipient source could not be read
    #[error("{0}")]
    Contract(#[from] contracts::ContractError),
}
