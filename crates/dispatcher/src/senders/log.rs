//! LogSender - logs message summaries via tracing (dry run)

use contracts::{DeliveryCredential, DeliveryError, MailSender, OutboundMessage};
use tracing::{info, instrument};

/// Sender that logs every message instead of transmitting it
pub struct LogSender {
    name: String,
}

impl LogSender {
    /// Create a new LogSender with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl MailSender for LogSender {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sender_deliver",
        skip(self, credential, message),
        fields(sender = %self.name)
    )]
    async fn deliver(
        &self,
        credential: &DeliveryCredential,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        info!(
            from = %message.from_address,
            from_name = %message.from_name,
            to = %message.to,
            subject = %message.subject,
            endpoint = %credential.endpoint(),
            authenticated = credential.secret().is_some(),
            body_bytes = message.html_body.len(),
            "Dry run, message not sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_accepts_everything() {
        let sender = LogSender::new("dry_run");
        let credential = DeliveryCredential::new("a@example.com", "mx", 25);
        let message = OutboundMessage {
            from_name: String::new(),
            from_address: "a@example.com".to_string(),
            to: "b@example.com".to_string(),
            subject: "s".to_string(),
            html_body: "<html><body></body></html>".to_string(),
        };
        assert!(sender.deliver(&credential, &message).await.is_ok());
        assert_eq!(sender.name(), "dry_run");
    }
}
