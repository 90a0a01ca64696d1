//! SmtpSender - one SMTP session per delivery attempt
//!
//! A credential with a login secret gets STARTTLS plus login; one without
//! is relayed in plain text with no authentication.

use std::time::Duration;

use contracts::{DeliveryCredential, DeliveryError, MailSender, OutboundMessage};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, instrument};

/// Configuration for SmtpSender
#[derive(Debug, Clone)]
pub struct SmtpSenderConfig {
    /// Per-command timeout for the SMTP session
    pub timeout: Duration,
}

impl Default for SmtpSenderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Sender that talks SMTP to the relay named by each credential
#[derive(Debug, Clone, Default)]
pub struct SmtpSender {
    config: SmtpSenderConfig,
}

impl SmtpSender {
    pub fn new(config: SmtpSenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SmtpSenderConfig {
        &self.config
    }

    fn transport(
        &self,
        credential: &DeliveryCredential,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let timeout = Some(self.config.timeout);
        match credential.secret() {
            Some(secret) => {
                let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
                    &credential.smtp_server,
                )
                .map_err(|e| DeliveryError::connection(credential.endpoint(), e.to_string()))?;
                Ok(builder
                    .port(credential.smtp_port)
                    .credentials(Credentials::new(
                        credential.sender_email.clone(),
                        secret.to_string(),
                    ))
                    .timeout(timeout)
                    .build())
            }
            None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                credential.smtp_server.as_str(),
            )
            .port(credential.smtp_port)
            .timeout(timeout)
            .build()),
        }
    }
}

/// Assemble the MIME message
pub(crate) fn build_message(message: &OutboundMessage) -> Result<Message, DeliveryError> {
    let from_address = parse_address(&message.from_address)?;
    let to_address = parse_address(&message.to)?;
    let from_name = Some(message.from_name.clone()).filter(|name| !name.is_empty());

    Message::builder()
        .from(Mailbox::new(from_name, from_address))
        .to(Mailbox::new(None, to_address))
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(message.html_body.clone())
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

fn parse_address(address: &str) -> Result<Address, DeliveryError> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|e| DeliveryError::invalid_address(address, e.to_string()))
}

/// Map a transport error to a delivery failure reason
fn classify(error: &SmtpError, credential: &DeliveryCredential) -> DeliveryError {
    let code = error.status().map(|code| code.to_string());
    match code.as_deref() {
        Some(code) if code.starts_with("53") && credential.secret().is_some() => {
            DeliveryError::authentication(&credential.sender_email, error.to_string())
        }
        Some(_) if error.is_permanent() => DeliveryError::Rejected(error.to_string()),
        _ => DeliveryError::connection(credential.endpoint(), error.to_string()),
    }
}

impl MailSender for SmtpSender {
    fn name(&self) -> &str {
        "smtp"
    }

    #[instrument(
        name = "smtp_sender_deliver",
        skip(self, credential, message),
        fields(endpoint = %credential.endpoint(), to = %message.to)
    )]
    async fn deliver(
        &self,
        credential: &DeliveryCredential,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        let email = build_message(message)?;
        let transport = self.transport(credential)?;

        let response = transport
            .send(email)
            .await
            .map_err(|e| classify(&e, credential))?;

        debug!(code = %response.code(), "Relay accepted message");
        Ok(())
    }
}
