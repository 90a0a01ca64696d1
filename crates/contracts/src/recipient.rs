//! RecipientRecord - one row of the recipient sheet

use serde::{Deserialize, Serialize};

/// Recipient record
///
/// Only `email` is required by the engine; a blank address makes the row a
/// skip. All values are trimmed by the loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRecord {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    /// Subject template
    #[serde(default)]
    pub subject: Option<String>,
    /// Body template
    #[serde(default)]
    pub body: Option<String>,
}

impl RecipientRecord {
    /// Create a record with only an address
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    /// Deliverable address, `None` when blank
    pub fn address(&self) -> Option<&str> {
        let email = self.email.trim();
        (!email.is_empty()).then_some(email)
    }
}
