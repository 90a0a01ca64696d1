//! Sender implementations
//!
//! Contains SmtpSender, LogSender, and RecordingSender.

mod log;
mod recording;
mod smtp;

pub use self::log::LogSender;
pub use self::recording::{RecordedAttempt, RecordingSender};
pub use self::smtp::{SmtpSender, SmtpSenderConfig};
