//! MailSender trait - the opaque transmission capability
//!
//! The engine only knows that a delivery attempt succeeds or fails with a
//! reason. Connection handling, authentication and timeouts belong to the
//! implementation.

use thiserror::Error;

use crate::{DeliveryCredential, OutboundMessage};

/// Why a single delivery attempt failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Sender or recipient address rejected before connecting
    #[error("invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    /// Message could not be assembled
    #[error("message build error: {0}")]
    Message(String),

    /// Could not reach or set up a session with the relay
    #[error("connection to {endpoint} failed: {message}")]
    Connection { endpoint: String, message: String },

    /// Login rejected
    #[error("authentication as '{user}' failed: {message}")]
    Authentication { user: String, message: String },

    /// Relay refused the message
    #[error("relay rejected message: {0}")]
    Rejected(String),
}

impl DeliveryError {
    /// Create invalid address error
    pub fn invalid_address(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create connection error
    pub fn connection(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create authentication error
    pub fn authentication(user: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            user: user.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable kind (used as a metrics label)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAddress { .. } => "invalid_address",
            Self::Message(_) => "message",
            Self::Connection { .. } => "connection",
            Self::Authentication { .. } => "authentication",
            Self::Rejected(_) => "rejected",
        }
    }
}

/// Message transmission trait
///
/// All sender implementations must implement this trait. A sender is shared
/// by reference with the engine task, so `deliver` takes `&self`.
#[trait_variant::make(MailSender: Send)]
pub trait LocalMailSender {
    /// Sender name (used for logging)
    fn name(&self) -> &str;

    /// Deliver `message` through the relay described by `credential`
    ///
    /// # Errors
    /// Returns the reason the attempt failed; the engine never retries.
    async fn deliver(
        &self,
        credential: &DeliveryCredential,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError>;
}
