//! DeliveryCredential - one outbound SMTP endpoint plus sender identity
//!
//! Field names match the persisted credential document.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Outbound delivery credential
///
/// Immutable once loaded. The presence of `sender_password` switches the
/// sender between authenticated and unauthenticated delivery.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DeliveryCredential {
    /// Envelope and `From` address
    #[validate(email)]
    pub sender_email: String,

    /// SMTP relay host
    #[validate(length(min = 1, message = "smtp_server cannot be empty"))]
    pub smtp_server: String,

    /// SMTP relay port
    #[validate(range(min = 1, message = "smtp_port must be >= 1"))]
    pub smtp_port: u16,

    /// Display name used in `From` and as `{sender_name}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,

    /// Login secret (absent = unauthenticated relay)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_password: Option<String>,
}

impl DeliveryCredential {
    /// Create an unauthenticated credential without display name
    pub fn new(
        sender_email: impl Into<String>,
        smtp_server: impl Into<String>,
        smtp_port: u16,
    ) -> Self {
        Self {
            sender_email: sender_email.into(),
            smtp_server: smtp_server.into(),
            smtp_port,
            sender_name: None,
            sender_password: None,
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    /// Set login secret
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.sender_password = Some(password.into());
        self
    }

    /// Display name, empty when not configured
    pub fn display_name(&self) -> &str {
        self.sender_name.as_deref().unwrap_or_default()
    }

    /// Login secret, `None` when absent or blank
    pub fn secret(&self) -> Option<&str> {
        self.sender_password
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
    }

    /// `host:port` of the relay (for logging)
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.smtp_server, self.smtp_port)
    }
}

impl fmt::Debug for DeliveryCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryCredential")
            .field("sender_email", &self.sender_email)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("sender_name", &self.sender_name)
            .field(
                "sender_password",
                &self.sender_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_persisted_record() {
        let json = r#"{
            "sender_email": "ops@example.com",
            "smtp_server": "smtp.example.com",
            "smtp_port": 587,
            "sender_password": null
        }"#;
        let cred: DeliveryCredential = serde_json::from_str(json).unwrap();
        assert_eq!(cred.smtp_port, 587);
        assert_eq!(cred.display_name(), "");
        assert!(cred.secret().is_none());
    }

    #[test]
    fn test_blank_secret_is_absent() {
        let cred = DeliveryCredential::new("a@example.com", "mx", 25).with_password("  ");
        assert!(cred.secret().is_none());

        let cred = cred.with_password("hunter2");
        assert_eq!(cred.secret(), Some("hunter2"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let cred = DeliveryCredential::new("a@example.com", "mx", 25).with_password("hunter2");
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_validation_rules() {
        let ok = DeliveryCredential::new("a@example.com", "mx.example.com", 25);
        assert!(ok.validate().is_ok());

        let bad_email = DeliveryCredential::new("not-an-address", "mx.example.com", 25);
        assert!(bad_email.validate().is_err());

        let bad_port = DeliveryCredential::new("a@example.com", "mx.example.com", 0);
        assert!(bad_port.validate().is_err());

        let bad_host = DeliveryCredential::new("a@example.com", "", 25);
        assert!(bad_host.validate().is_err());
    }
}
