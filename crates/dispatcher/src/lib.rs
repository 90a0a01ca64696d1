//! # Dispatcher
//!
//! Bulk message dispatch engine.
//!
//! Responsibilities:
//! - Walk a recipient window by cursor, one recipient at a time
//! - Render per-recipient subject/body and rotate across delivery credentials
//! - Pace successful deliveries, skip failures without retrying
//! - Expose pause / resume / stop / progress to concurrent callers
//!
//! ## Usage
//!
//! ```ignore
//! let control = JobControl::new();
//! let outcome = control.start(job, Arc::new(SmtpSender::default()))?;
//!
//! control.pause();
//! println!("{:?}", control.progress());
//! control.resume();
//!
//! let report = control.join().await;
//! ```

pub mod control;
pub mod engine;
pub mod error;
pub mod rotator;
pub mod senders;
pub mod state;
pub mod template;
pub mod window;

pub use contracts::{DeliveryCredential, MailSender, RecipientRecord, RecipientSource};
pub use control::{DispatchJob, JobControl, JobStarted, StartOutcome};
pub use engine::{DispatchEngine, JobReport};
pub use error::DispatchError;
pub use rotator::{CredentialRotator, Rotation};
pub use senders::{LogSender, RecordedAttempt, RecordingSender, SmtpSender, SmtpSenderConfig};
pub use state::{JobPhase, JobStatus, ProgressSnapshot};
pub use window::DispatchWindow;
