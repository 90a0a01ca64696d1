//! RecordingSender - in-memory sender for tests and rehearsals

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use contracts::{DeliveryCredential, DeliveryError, MailSender, OutboundMessage};

/// One attempt seen by a [`RecordingSender`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAttempt {
    pub sender_email: String,
    pub endpoint: String,
    /// Whether the credential carried a login secret
    pub authenticated: bool,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    /// Whether the attempt was reported as delivered
    pub accepted: bool,
}

/// Sender that records every attempt and optionally fails chosen recipients
pub struct RecordingSender {
    name: String,
    failing: HashSet<String>,
    latency: Duration,
    attempts: Mutex<Vec<RecordedAttempt>>,
}

impl RecordingSender {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failing: HashSet::new(),
            latency: Duration::ZERO,
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Reject deliveries to these addresses
    pub fn failing_for<I, A>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.failing.extend(addresses.into_iter().map(Into::into));
        self
    }

    /// Simulated time per attempt
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// All attempts in order
    pub fn attempts(&self) -> Vec<RecordedAttempt> {
        self.attempts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Accepted attempts only
    pub fn deliveries(&self) -> Vec<RecordedAttempt> {
        self.attempts()
            .into_iter()
            .filter(|attempt| attempt.accepted)
            .collect()
    }
}

impl MailSender for RecordingSender {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(
        &self,
        credential: &DeliveryCredential,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let accepted = !self.failing.contains(&message.to);
        self.attempts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedAttempt {
                sender_email: credential.sender_email.clone(),
                endpoint: credential.endpoint(),
                authenticated: credential.secret().is_some(),
                to: message.to.clone(),
                subject: message.subject.clone(),
                html_body: message.html_body.clone(),
                accepted,
            });

        if accepted {
            Ok(())
        } else {
            Err(DeliveryError::Rejected(format!(
                "550 mailbox unavailable: {}",
                message.to
            )))
        }
    }
}
