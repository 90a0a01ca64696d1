//! `send` command implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use contracts::{DeliveryCredential, MailSender};
use credential_store::CredentialStore;
use dispatcher::{DispatchJob, JobControl, JobPhase, JobReport, LogSender, StartOutcome};
use recipients::RecipientSheet;
use tracing::{info, warn};

use super::signal::shutdown_signal;
use super::smtp_sender;
use crate::cli::SendArgs;
use crate::error::{self, CliError};
use crate::report;

/// Execute the `send` command
pub async fn run_send(args: &SendArgs) -> Result<()> {
    let delay = parse_delay(args.delay)?;
    let (credentials, sheet) = load_inputs(&args.delivery.credentials, &args.sheet)
        .with_context(|| format!("Failed to prepare dispatch from {}", args.sheet.display()))?;

    info!(
        sheet = %args.sheet.display(),
        rows = sheet.len(),
        deliverable = sheet.deliverable_count(),
        credentials = credentials.len(),
        dry_run = args.delivery.dry_run,
        "Inputs loaded"
    );

    let job = DispatchJob {
        credentials,
        recipients: Arc::new(sheet),
        delay,
        min_index: args.min,
        max_index: args.max,
    };

    let report = if args.delivery.dry_run {
        dispatch(job, Arc::new(LogSender::new("dry_run"))).await?
    } else {
        dispatch(job, Arc::new(smtp_sender(&args.delivery))).await?
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize job report")?;
        println!("{}", json);
    } else {
        report::print_summary(&report);
    }

    if report.phase == JobPhase::Stopped {
        warn!(cursor = report.cursor, "Dispatch stopped before the end of its window");
    }
    Ok(())
}

/// Run one job to completion; a shutdown signal requests a stop
async fn dispatch<S>(job: DispatchJob, sender: Arc<S>) -> error::Result<JobReport>
where
    S: MailSender + Sync + 'static,
{
    let control = JobControl::new();
    match control.start(job, sender)? {
        StartOutcome::Started(started) => info!(
            min_index = started.window.min_index,
            max_index = started.window.max_index,
            total_target = started.total_target,
            "Dispatching (Ctrl+C to stop)"
        ),
        // fresh control, nothing else can be running
        StartOutcome::AlreadyRunning => return Err(CliError::DispatchAborted),
    }

    let stopper = control.clone();
    let watcher = tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping after the current recipient...");
        stopper.request_stop();
    });

    let report = control.join().await;
    watcher.abort();
    report.ok_or(CliError::DispatchAborted)
}

/// Load and validate the credential document and recipient sheet
pub(crate) fn load_inputs(
    credentials: &Path,
    sheet: &Path,
) -> error::Result<(Vec<DeliveryCredential>, RecipientSheet)> {
    let store = CredentialStore::open(credentials)?;
    let credentials = store.load()?;
    let sheet = RecipientSheet::load_from_path(sheet)?;
    Ok((credentials, sheet))
}

fn parse_delay(seconds: f64) -> error::Result<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        CliError::invalid_argument(
            "delay",
            format!("must be a non-negative number of seconds ({e})"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_delay() {
        assert_eq!(parse_delay(1.5).unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_delay(0.0).unwrap(), Duration::ZERO);
        assert!(parse_delay(-1.0).is_err());
        assert!(parse_delay(f64::NAN).is_err());
        assert!(matches!(
            parse_delay(1e300),
            Err(CliError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_dispatch_dry_run_completes() {
        let dir = TempDir::new().unwrap();
        let creds = dir.path().join("configurations.json");
        std::fs::write(
            &creds,
            r#"[{"sender_email": "a@example.com", "smtp_server": "mx", "smtp_port": 25}]"#,
        )
        .unwrap();
        let sheet = dir.path().join("r.csv");
        std::fs::write(&sheet, "email,subject\nx@example.com,Hi\ny@example.com,Hi\n").unwrap();

        let (credentials, sheet) = load_inputs(&creds, &sheet).unwrap();
        let job = DispatchJob {
            credentials,
            recipients: Arc::new(sheet),
            delay: Duration::ZERO,
            min_index: 1,
            max_index: 100,
        };
        let report = dispatch(job, Arc::new(LogSender::new("dry_run"))).await.unwrap();
        assert_eq!(report.phase, JobPhase::Completed);
        assert_eq!(report.sent, 2);
    }

    #[tokio::test]
    async fn test_dispatch_without_credentials_fails() {
        let dir = TempDir::new().unwrap();
        let sheet = dir.path().join("r.csv");
        std::fs::write(&sheet, "email\nx@example.com\n").unwrap();

        let (credentials, sheet) = load_inputs(&dir.path().join("none.json"), &sheet).unwrap();
        let job = DispatchJob {
            credentials,
            recipients: Arc::new(sheet),
            delay: Duration::ZERO,
            min_index: 1,
            max_index: 1,
        };
        let err = dispatch(job, Arc::new(LogSender::new("dry_run")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Dispatch(dispatcher::DispatchError::NoCredentials)
        ));
    }
}
