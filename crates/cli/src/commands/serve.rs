//! `serve` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::MailSender;
use control_api::AppState;
use credential_store::CredentialStore;
use dispatcher::{JobControl, LogSender};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::signal::shutdown_signal;
use super::smtp_sender;
use crate::cli::ServeArgs;
use crate::report;

/// Execute the `serve` command
pub async fn run_serve(args: &ServeArgs) -> Result<()> {
    let store = CredentialStore::open(&args.delivery.credentials).with_context(|| {
        format!(
            "Unsupported credential document {}",
            args.delivery.credentials.display()
        )
    })?;
    let configured = store
        .load()
        .with_context(|| format!("Failed to load {}", store.path().display()))?
        .len();
    info!(
        path = %store.path().display(),
        credentials = configured,
        dry_run = args.delivery.dry_run,
        "Credential document loaded"
    );

    if args.delivery.dry_run {
        serve(args, store, Arc::new(LogSender::new("dry_run"))).await
    } else {
        serve(args, store, Arc::new(smtp_sender(&args.delivery))).await
    }
}

async fn serve<S>(args: &ServeArgs, store: CredentialStore, sender: Arc<S>) -> Result<()>
where
    S: MailSender + Sync + 'static,
{
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    let control = JobControl::new();
    let state = AppState::new(control.clone(), sender, store);

    control_api::serve(listener, state, shutdown_signal())
        .await
        .context("Control API server failed")?;

    if control.is_active() {
        warn!("Shutting down with an active job, requesting stop...");
        control.request_stop();
    }
    if let Some(report) = control.join().await {
        report::print_summary(&report);
    }

    info!("Mail dispatch server finished");
    Ok(())
}
