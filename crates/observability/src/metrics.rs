//! Dispatch metrics
//!
//! Thin wrappers over the `metrics` facade so metric names stay in one
//! place. Without an installed recorder every call is a no-op.

use metrics::{counter, gauge};

/// A job was started over `total_target` recipients
pub fn record_job_started(total_target: u64) {
    counter!("mail_dispatch_jobs_started_total").increment(1);
    gauge!("mail_dispatch_total_target").set(total_target as f64);
    gauge!("mail_dispatch_running").set(1.0);
}

/// A job ended in `phase` ("completed" / "stopped")
pub fn record_job_finished(phase: &'static str, sent: u64, attempted: u64) {
    counter!("mail_dispatch_jobs_finished_total", "phase" => phase).increment(1);
    gauge!("mail_dispatch_running").set(0.0);
    gauge!("mail_dispatch_last_job_sent").set(sent as f64);
    gauge!("mail_dispatch_last_job_attempted").set(attempted as f64);
}

/// One delivery succeeded through `sender`
pub fn record_delivery_sent(sender: &str) {
    counter!("mail_dispatch_sent_total", "sender" => sender.to_string()).increment(1);
}

/// One delivery failed through `sender`
pub fn record_delivery_failed(sender: &str, kind: &'static str) {
    counter!(
        "mail_dispatch_failed_total",
        "sender" => sender.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// A recipient row without address was skipped
pub fn record_recipient_skipped() {
    counter!("mail_dispatch_skipped_total").increment(1);
}

/// Cursor position after each recipient
pub fn record_cursor(cursor: usize) {
    gauge!("mail_dispatch_cursor").set(cursor as f64);
}
