//! DispatchEngine - the sequential cursor walk over one recipient window

use std::sync::Arc;
use std::time::Duration;

use contracts::{MailSender, RecipientSource};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::control::{Gate, JobControl};
use crate::rotator::CredentialRotator;
use crate::state::JobPhase;
use crate::template;
use crate::window::DispatchWindow;

/// Summary of a finished job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub window: DispatchWindow,
    /// `Completed` or `Stopped`
    pub phase: JobPhase,
    /// Delivery attempts made (sent + failed)
    pub attempted: u64,
    pub sent: u64,
    pub failed: u64,
    /// Rows without a usable address
    pub skipped: u64,
    /// Cursor when the job ended
    pub cursor: usize,
    /// Attempts per credential slot, in rotation order
    pub attempts_per_credential: Vec<u64>,
}

/// Runs one job to completion or stop
///
/// Created by [`JobControl::start`]; owns everything the worker task needs.
pub struct DispatchEngine<S> {
    control: JobControl,
    sender: Arc<S>,
    recipients: Arc<dyn RecipientSource>,
    rotator: CredentialRotator,
    window: DispatchWindow,
    delay: Duration,
}

impl<S: MailSender + Sync + 'static> DispatchEngine<S> {
    pub(crate) fn new(
        control: JobControl,
        sender: Arc<S>,
        recipients: Arc<dyn RecipientSource>,
        rotator: CredentialRotator,
        window: DispatchWindow,
        delay: Duration,
    ) -> Self {
        Self {
            control,
            sender,
            recipients,
            rotator,
            window,
            delay,
        }
    }

    /// Walk the window
    ///
    /// Per recipient: check point, skip blank addresses, rotate, render,
    /// deliver. Success advances the cursor and paces; failure advances the
    /// cursor immediately. Nothing is retried.
    #[instrument(
        name = "dispatch_engine_run",
        skip(self),
        fields(
            sender = %self.sender.name(),
            min_index = self.window.min_index,
            max_index = self.window.max_index
        )
    )]
    pub async fn run(mut self) -> JobReport {
        let mut cursor = self.window.start_cursor();
        let end = self.window.end_cursor();
        let mut report = JobReport {
            window: self.window,
            phase: JobPhase::Completed,
            attempted: 0,
            sent: 0,
            failed: 0,
            skipped: 0,
            cursor,
            attempts_per_credential: vec![0; self.rotator.len()],
        };

        while cursor < end {
            if self.control.checkpoint().await == Gate::Stop {
                info!(cursor, "Stop observed, ending job");
                report.phase = JobPhase::Stopped;
                break;
            }

            let Some((record, address)) = self
                .recipients
                .get(cursor)
                .and_then(|record| record.address().map(|address| (record, address)))
            else {
                debug!(row = cursor + 1, "Recipient without address, skipping");
                cursor += 1;
                report.skipped += 1;
                self.control.record_skip(cursor);
                observability::record_recipient_skipped();
                observability::record_cursor(cursor);
                continue;
            };
            let rotation = self.rotator.next_credential();
            report.attempts_per_credential[rotation.slot] += 1;
            report.attempted += 1;

            let message = template::compose(record, address, rotation.credential);
            let result = self.sender.deliver(rotation.credential, &message).await;
            cursor += 1;

            match result {
                Ok(()) => {
                    report.sent += 1;
                    self.control.record_sent(cursor);
                    observability::record_delivery_sent(&rotation.credential.sender_email);
                    observability::record_cursor(cursor);
                    info!(
                        row = cursor,
                        to = %address,
                        from = %rotation.credential.sender_email,
                        slot = rotation.slot,
                        "Message delivered"
                    );
                    self.control.pace(self.delay).await;
                }
                Err(e) => {
                    report.failed += 1;
                    self.control.record_failed(cursor);
                    observability::record_delivery_failed(
                        &rotation.credential.sender_email,
                        e.kind(),
                    );
                    observability::record_cursor(cursor);
                    match &e {
                        contracts::DeliveryError::InvalidAddress { .. } => warn!(
                            row = cursor,
                            to = %address,
                            error = %e,
                            "Recipient skipped, invalid address"
                        ),
                        _ => error!(
                            row = cursor,
                            to = %address,
                            from = %rotation.credential.sender_email,
                            endpoint = %rotation.credential.endpoint(),
                            error = %e,
                            "Delivery failed"
                        ),
                    }
                }
            }
        }

        report.cursor = cursor;
        self.control.finish(report.phase);
        observability::record_job_finished(report.phase.as_str(), report.sent, report.attempted);

        info!(
            phase = report.phase.as_str(),
            attempted = report.attempted,
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            cursor = report.cursor,
            "Dispatch job finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{DispatchJob, StartOutcome};
    use crate::senders::RecordingSender;
    use contracts::{DeliveryCredential, RecipientRecord};

    fn credentials(n: usize) -> Vec<DeliveryCredential> {
        (0..n)
            .map(|i| {
                DeliveryCredential::new(format!("s{i}@example.com"), format!("mx{i}"), 587)
                    .with_name(format!("Sender {i}"))
            })
            .collect()
    }

    fn recipients(n: usize) -> Vec<RecipientRecord> {
        (0..n)
            .map(|i| RecipientRecord {
                email: format!("r{i}@example.com"),
                first_name: Some(format!("Name{i}")),
                subject: Some("Hi {first_name}".to_string()),
                body: Some("Line\n• item\nfrom {sender_name}".to_string()),
                ..Default::default()
            })
            .collect()
    }

    async fn run_job(
        sender: &Arc<RecordingSender>,
        credentials: Vec<DeliveryCredential>,
        rows: Vec<RecipientRecord>,
        min_index: usize,
        max_index: usize,
    ) -> (JobControl, JobReport) {
        let control = JobControl::new();
        let job = DispatchJob {
            credentials,
            recipients: Arc::new(rows),
            delay: Duration::ZERO,
            min_index,
            max_index,
        };
        let outcome = control.start(job, Arc::clone(sender)).unwrap();
        assert!(matches!(outcome, StartOutcome::Started(_)));
        let report = control.join().await.unwrap();
        (control, report)
    }

    #[tokio::test]
    async fn test_rotation_across_three_credentials() {
        let sender = Arc::new(RecordingSender::new("rec"));
        let (control, report) = run_job(&sender, credentials(3), recipients(5), 1, 5).await;

        let from: Vec<String> = sender
            .attempts()
            .into_iter()
            .map(|a| a.sender_email)
            .collect();
        assert_eq!(
            from,
            vec![
                "s0@example.com",
                "s1@example.com",
                "s2@example.com",
                "s0@example.com",
                "s1@example.com"
            ]
        );
        assert_eq!(report.attempts_per_credential, vec![2, 2, 1]);
        assert_eq!(report.phase, JobPhase::Completed);

        let progress = control.progress();
        assert_eq!((progress.total_emails, progress.sent_emails), (5, 5));
        assert_eq!(control.status().cursor, 5);
        assert!(!control.status().running);
    }

    #[tokio::test]
    async fn test_window_selects_rows() {
        let sender = Arc::new(RecordingSender::new("rec"));
        let (control, report) = run_job(&sender, credentials(1), recipients(10), 3, 5).await;

        let to: Vec<String> = sender.attempts().into_iter().map(|a| a.to).collect();
        assert_eq!(to, vec!["r2@example.com", "r3@example.com", "r4@example.com"]);
        assert_eq!(report.cursor, 5);
        assert_eq!(control.progress().total_emails, 3);
    }

    #[tokio::test]
    async fn test_reversed_window_is_swapped() {
        let sender = Arc::new(RecordingSender::new("rec"));
        let (_, report) = run_job(&sender, credentials(2), recipients(10), 4, 2).await;
        assert!(report.window.swapped);
        assert_eq!((report.window.min_index, report.window.max_index), (2, 4));
        assert_eq!(report.sent, 3);
    }

    #[tokio::test]
    async fn test_message_rendering_reaches_sender() {
        let sender = Arc::new(RecordingSender::new("rec"));
        run_job(&sender, credentials(1), recipients(1), 1, 1).await;

        let attempt = &sender.attempts()[0];
        assert_eq!(attempt.subject, "Hi Name0");
        assert_eq!(
            attempt.html_body,
            "<html><body>Line<br>&bull; item<br>from Sender 0</body></html>"
        );
        assert_eq!(attempt.endpoint, "mx0:587");
        assert!(!attempt.authenticated);
    }

    #[tokio::test]
    async fn test_blank_address_is_skipped_without_rotation() {
        let mut rows = recipients(4);
        rows[1].email = "   ".to_string();
        let sender = Arc::new(RecordingSender::new("rec"));
        let (control, report) = run_job(&sender, credentials(2), rows, 1, 4).await;

        assert_eq!(report.skipped, 1);
        assert_eq!(report.sent, 3);
        assert_eq!(report.attempted, 3);
        // the skipped row does not consume a rotation slot
        assert_eq!(report.attempts_per_credential, vec![2, 1]);

        let status = control.status();
        assert_eq!(status.skipped_count, 1);
        assert_eq!(status.sent_count, 3);
        assert_eq!(status.cursor, 4);
    }

    #[tokio::test]
    async fn test_failure_advances_and_continues() {
        let sender = Arc::new(RecordingSender::new("rec").failing_for(["r1@example.com"]));
        let (control, report) = run_job(&sender, credentials(2), recipients(3), 1, 3).await;

        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.attempted, 3);
        assert_eq!(report.phase, JobPhase::Completed);
        assert_eq!(sender.attempts().len(), 3);
        assert_eq!(sender.deliveries().len(), 2);

        let status = control.status();
        assert_eq!(status.failed_count, 1);
        assert_eq!(status.cursor, 3);
        assert_eq!(control.progress().sent_emails, 2);
    }

    #[tokio::test]
    async fn test_progress_counts_only_successes() {
        let sender = Arc::new(
            RecordingSender::new("rec").failing_for(["r0@example.com", "r2@example.com"]),
        );
        let (control, _) = run_job(&sender, credentials(1), recipients(4), 1, 4).await;
        let progress = control.progress();
        assert_eq!(progress.total_emails, 4);
        assert_eq!(progress.sent_emails, 2);
    }

    #[tokio::test]
    async fn test_authenticated_credential_flagged() {
        let sender = Arc::new(RecordingSender::new("rec"));
        let creds = vec![DeliveryCredential::new("a@example.com", "mx", 587).with_password("pw")];
        run_job(&sender, creds, recipients(1), 1, 1).await;
        assert!(sender.attempts()[0].authenticated);
    }
}
