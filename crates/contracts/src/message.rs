//! OutboundMessage - fully rendered message handed to a `MailSender`

/// Rendered message for one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Display name for `From` (may be empty)
    pub from_name: String,
    /// Envelope sender / `From` address
    pub from_address: String,
    /// Recipient address
    pub to: String,
    /// Rendered subject
    pub subject: String,
    /// Rendered HTML body (already wrapped in the markup envelope)
    pub html_body: String,
}
