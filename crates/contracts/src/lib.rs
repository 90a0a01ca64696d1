//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! delivery credentials, recipient records, outbound messages, and the two
//! capabilities the dispatch engine is written against (`MailSender`,
//! `RecipientSource`).
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Index model
//! - Recipients are addressed by a stable 0-based index into their source
//! - Dispatch windows are expressed 1-based and inclusive, the way operators
//!   count spreadsheet rows

mod credential;
mod error;
mod message;
mod recipient;
mod recipient_source;
mod sender;

pub use credential::DeliveryCredential;
pub use error::*;
pub use message::OutboundMessage;
pub use recipient::RecipientRecord;
pub use recipient_source::RecipientSource;
pub use sender::{DeliveryError, LocalMailSender, MailSender};
