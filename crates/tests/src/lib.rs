//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Responsibilities:
//! - Credential document and recipient sheet loading across crates
//! - Sheet -> JobControl -> sender e2e runs (no network)
//! - Pause / resume / stop behavior against a live worker

#[cfg(test)]
mod contract_tests {
    use contracts::DeliveryCredential;
    use credential_store::{CredentialStore, StoreFormat};

    #[test]
    fn test_json_and_toml_documents_agree() {
        let json = r#"[
            {"sender_email": "a@example.com", "smtp_server": "mx1", "smtp_port": 587,
             "sender_name": "Alice", "sender_password": "pw"},
            {"sender_email": "b@example.com", "smtp_server": "mx2", "smtp_port": 25}
        ]"#;
        let toml = r#"
            [[credentials]]
            sender_email = "a@example.com"
            smtp_server = "mx1"
            smtp_port = 587
            sender_name = "Alice"
            sender_password = "pw"

            [[credentials]]
            sender_email = "b@example.com"
            smtp_server = "mx2"
            smtp_port = 25
        "#;

        let from_json = CredentialStore::load_from_str(json, StoreFormat::Json).unwrap();
        let from_toml = CredentialStore::load_from_str(toml, StoreFormat::Toml).unwrap();
        assert_eq!(from_json, from_toml);
        assert_eq!(
            from_json[0],
            DeliveryCredential::new("a@example.com", "mx1", 587)
                .with_name("Alice")
                .with_password("pw")
        );
        assert!(from_json[1].secret().is_none());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{DeliveryCredential, DeliveryError, MailSender, OutboundMessage};
    use credential_store::CredentialStore;
    use dispatcher::{
        DispatchJob, JobControl, JobPhase, JobReport, RecordingSender, StartOutcome,
    };
    use recipients::RecipientSheet;
    use tempfile::TempDir;
    use tokio::time::{sleep, timeout};

    const SHEET: &str = "\
Email,First_Name,Last_Name,Company_Name,Subject,Body
ann@example.com,Ann,Lee,Acme,Hello {first_name},\"Hi {first_name} {last_name},\n• {company_name}\nRegards {sender_name}\"
bob@example.com,Bob,,Initech,Hello {first_name},Hi {first_name}
,Nobody,,,Hello,Hi
cat@example.com,Cat,,,Hello {first_name},Hi {first_name}
dan@example.com,Dan,,,Hello {first_name},Hi {first_name}
eve@example.com,Eve,,,Hello {first_name},Hi {first_name}
";

    fn credentials(n: usize) -> Vec<DeliveryCredential> {
        (0..n)
            .map(|i| {
                DeliveryCredential::new(format!("s{i}@example.com"), format!("mx{i}"), 587)
                    .with_name(format!("Sender {i}"))
            })
            .collect()
    }

    fn numbered_sheet(rows: usize) -> RecipientSheet {
        let mut csv = String::from("email,first_name,subject,body\n");
        for i in 0..rows {
            csv.push_str(&format!("r{i}@example.com,N{i},S {{first_name}},B\n"));
        }
        RecipientSheet::from_csv_str(&csv).unwrap()
    }

    fn job(
        credentials: Vec<DeliveryCredential>,
        sheet: RecipientSheet,
        delay_ms: u64,
        min_index: usize,
        max_index: usize,
    ) -> DispatchJob {
        DispatchJob {
            credentials,
            recipients: Arc::new(sheet),
            delay: Duration::from_millis(delay_ms),
            min_index,
            max_index,
        }
    }

    async fn finish(control: &JobControl) -> JobReport {
        timeout(Duration::from_secs(5), control.join())
            .await
            .expect("job did not finish in time")
            .expect("worker produced no report")
    }

    async fn wait_for_sent(control: &JobControl, sent: u64) {
        timeout(Duration::from_secs(5), async {
            while control.progress().sent_emails < sent {
                sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("sent count not reached");
    }

    /// End-to-end: CSV sheet + credential document on disk -> JobControl -> sender
    #[tokio::test]
    async fn test_e2e_sheet_to_sender() {
        let dir = TempDir::new().unwrap();
        let sheet_path = dir.path().join("recipients.csv");
        std::fs::write(&sheet_path, SHEET).unwrap();

        let store = CredentialStore::open(dir.path().join("configurations.json")).unwrap();
        for credential in credentials(2) {
            store.append(credential).unwrap();
        }

        let sheet = RecipientSheet::load_from_path(&sheet_path).unwrap();
        assert_eq!(sheet.len(), 6);

        let control = JobControl::new();
        let sender = Arc::new(RecordingSender::new("rec"));
        let outcome = control
            .start(job(store.load().unwrap(), sheet, 0, 1, 100), Arc::clone(&sender))
            .unwrap();
        let StartOutcome::Started(started) = outcome else {
            panic!("job should start");
        };
        assert_eq!(started.total_target, 6);

        let report = finish(&control).await;
        assert_eq!(report.phase, JobPhase::Completed);
        assert_eq!(report.sent, 5);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.attempts_per_credential, vec![3, 2]);

        let attempts = sender.attempts();
        assert_eq!(attempts[0].to, "ann@example.com");
        assert_eq!(attempts[0].subject, "Hello Ann");
        assert_eq!(
            attempts[0].html_body,
            "<html><body>Hi Ann Lee,<br>&bull; Acme<br>Regards Sender 0</body></html>"
        );
        assert_eq!(attempts[1].sender_email, "s1@example.com");
        // blank row skipped without consuming a rotation step
        assert_eq!(attempts[2].to, "cat@example.com");
        assert_eq!(attempts[2].sender_email, "s0@example.com");

        let progress = control.progress();
        assert_eq!((progress.total_emails, progress.sent_emails), (6, 5));
    }

    #[tokio::test]
    async fn test_e2e_rotation_three_by_five() {
        let control = JobControl::new();
        let sender = Arc::new(RecordingSender::new("rec"));
        control
            .start(job(credentials(3), numbered_sheet(5), 0, 1, 5), Arc::clone(&sender))
            .unwrap();

        let report = finish(&control).await;
        let order: Vec<String> = sender
            .deliveries()
            .into_iter()
            .map(|a| a.sender_email)
            .collect();
        assert_eq!(
            order,
            [
                "s0@example.com",
                "s1@example.com",
                "s2@example.com",
                "s0@example.com",
                "s1@example.com"
            ]
        );
        assert_eq!(report.sent, 5);
        assert_eq!(report.cursor, 5);
    }

    #[tokio::test]
    async fn test_e2e_form_defaults() {
        // min 10 / max 100 over a 150-row sheet
        let control = JobControl::new();
        let sender = Arc::new(RecordingSender::new("rec"));
        control
            .start(job(credentials(2), numbered_sheet(150), 0, 10, 100), Arc::clone(&sender))
            .unwrap();

        let report = finish(&control).await;
        assert_eq!(report.window.total_target(), 91);
        assert_eq!(report.sent, 91);
        assert_eq!(sender.attempts()[0].to, "r9@example.com");
        assert_eq!(report.cursor, 100);
    }

    #[tokio::test]
    async fn test_e2e_pause_resume_stop() {
        let control = JobControl::new();
        let sender = Arc::new(RecordingSender::new("rec"));
        control
            .start(job(credentials(2), numbered_sheet(20), 15, 1, 20), Arc::clone(&sender))
            .unwrap();

        wait_for_sent(&control, 3).await;
        control.pause();
        sleep(Duration::from_millis(60)).await;

        let frozen = control.progress();
        let cursor = control.status().cursor;
        sleep(Duration::from_millis(60)).await;
        assert_eq!(control.progress(), frozen);
        assert_eq!(control.status().cursor, cursor);
        assert_eq!(control.status().phase, JobPhase::Paused);

        control.resume();
        wait_for_sent(&control, frozen.sent_emails + 2).await;
        control.request_stop();

        let report = finish(&control).await;
        assert_eq!(report.phase, JobPhase::Stopped);
        assert!(report.sent < 20);
        assert!(report.sent >= frozen.sent_emails + 2);
        assert!(!control.is_active());
        assert_eq!(control.status().phase, JobPhase::Stopped);
    }

    /// Relay that rejects logins for one sender address
    struct FlakyRelay {
        broken_sender: String,
    }

    impl MailSender for FlakyRelay {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn deliver(
            &self,
            credential: &DeliveryCredential,
            _message: &OutboundMessage,
        ) -> Result<(), DeliveryError> {
            if credential.sender_email == self.broken_sender {
                Err(DeliveryError::authentication(
                    &credential.sender_email,
                    "535 authentication failed",
                ))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_e2e_failing_credential_is_skipped_not_retried() {
        let control = JobControl::new();
        let relay = Arc::new(FlakyRelay {
            broken_sender: "s1@example.com".to_string(),
        });
        control
            .start(job(credentials(2), numbered_sheet(7), 0, 1, 7), relay)
            .unwrap();

        let report = finish(&control).await;
        assert_eq!(report.attempted, 7);
        assert_eq!(report.sent, 4);
        assert_eq!(report.failed, 3);
        assert_eq!(report.cursor, 7);

        let status = control.status();
        assert!(status.sent_count <= status.total_target);
        assert_eq!(status.failed_count, 3);
        assert_eq!(control.progress().sent_emails, 4);
    }

    #[tokio::test]
    async fn test_e2e_restart_after_stop() {
        let control = JobControl::new();
        let sender = Arc::new(RecordingSender::new("rec"));
        control
            .start(job(credentials(1), numbered_sheet(10), 200, 1, 10), Arc::clone(&sender))
            .unwrap();
        wait_for_sent(&control, 1).await;
        control.request_stop();
        let first = finish(&control).await;
        assert_eq!(first.phase, JobPhase::Stopped);

        // resume from where the previous job stopped
        let next_min = first.cursor + 1;
        control
            .start(job(credentials(1), numbered_sheet(10), 0, next_min, 10), Arc::clone(&sender))
            .unwrap();
        let second = finish(&control).await;
        assert_eq!(second.phase, JobPhase::Completed);
        assert_eq!(first.sent + second.sent, 10);
        assert_eq!(sender.deliveries().len(), 10);
    }
}
