//! Per-recipient subject/body rendering
//!
//! Literal `{name}` substitution for a fixed set of placeholders. Unknown
//! tokens are left alone; absent values render as empty text.

use std::collections::BTreeMap;

use contracts::{DeliveryCredential, OutboundMessage, RecipientRecord};

/// Placeholders substituted by [`render`]
pub const PLACEHOLDERS: [&str; 4] = ["first_name", "last_name", "company_name", "sender_name"];

/// Named values available to a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFields {
    values: BTreeMap<&'static str, String>,
}

impl TemplateFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    /// Fields for one recipient sent through `credential`
    pub fn for_recipient(record: &RecipientRecord, credential: &DeliveryCredential) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self::new()
            .with("first_name", text(&record.first_name))
            .with("last_name", text(&record.last_name))
            .with("company_name", text(&record.company_name))
            .with("sender_name", credential.display_name())
    }

    /// Value of `name`, empty when unset
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// Substitute every recognized placeholder in `template`
pub fn render(template: &str, fields: &TemplateFields) -> String {
    PLACEHOLDERS
        .iter()
        .fold(template.to_string(), |text, name| {
            text.replace(&format!("{{{name}}}"), fields.get(name))
        })
}

/// Convert plain body text to the HTML envelope
///
/// A newline followed by `•` becomes `<br>&bull;`; remaining newlines become
/// `<br>`.
pub fn to_html(body: &str) -> String {
    let html = body
        .replace("\r\n", "\n")
        .replace("\n•", "<br>&bull;")
        .replace('\n', "<br>");
    format!("<html><body>{html}</body></html>")
}

/// Render the full message for `record`, delivered to `to` via `credential`
pub fn compose(
    record: &RecipientRecord,
    to: &str,
    credential: &DeliveryCredential,
) -> OutboundMessage {
    let fields = TemplateFields::for_recipient(record, credential);
    let subject = render(record.subject.as_deref().unwrap_or_default(), &fields);
    let body = render(record.body.as_deref().unwrap_or_default(), &fields);

    OutboundMessage {
        from_name: credential.display_name().to_string(),
        from_address: credential.sender_email.clone(),
        to: to.to_string(),
        subject,
        html_body: to_html(&body),
    }
}
