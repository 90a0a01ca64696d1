//! Command implementations.

mod credentials;
mod send;
mod serve;
mod signal;
mod validate;

pub use credentials::run_credentials;
pub use send::run_send;
pub use serve::run_serve;
pub use validate::run_validate;

use std::time::Duration;

use dispatcher::{SmtpSender, SmtpSenderConfig};

use crate::cli::DeliveryArgs;

/// SMTP sender configured from the shared delivery options
fn smtp_sender(args: &DeliveryArgs) -> SmtpSender {
    SmtpSender::new(SmtpSenderConfig {
        timeout: Duration::from_secs(args.smtp_timeout.max(1)),
    })
}
