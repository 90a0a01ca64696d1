//! # Control API
//!
//! HTTP surface for the dispatch job.
//!
//! Responsibilities:
//! - Start a job from a recipient sheet and the stored credentials
//! - Pause / resume / stop the running job and report its progress
//! - List and append delivery credentials
//!
//! ## Usage
//!
//! ```ignore
//! let state = AppState::new(JobControl::new(), Arc::new(SmtpSender::default()), store);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! control_api::serve(listener, state, shutdown_signal()).await?;
//! ```

mod handlers;
mod response;
mod state;

use std::future::Future;

use axum::routing::{get, post};
use axum::Router;
use contracts::MailSender;
use tokio::net::TcpListener;
use tracing::info;

pub use crate::handlers::{CredentialView, SendRequest};
pub use crate::state::AppState;

/// Build the router over `state`
pub fn router<S>(state: AppState<S>) -> Router
where
    S: MailSender + Sync + 'static,
{
    Router::new()
        .route("/health", get(handlers::health))
        .route("/pause", post(handlers::pause::<S>))
        .route("/resume", post(handlers::resume::<S>))
        .route("/stop", post(handlers::stop::<S>))
        .route("/progress", get(handlers::progress::<S>))
        .route("/status", get(handlers::status::<S>))
        .route("/send", post(handlers::send::<S>))
        .route(
            "/config",
            get(handlers::list_credentials::<S>).post(handlers::add_credential::<S>),
        )
        .with_state(state)
}

/// Serve the API until `shutdown` resolves
pub async fn serve<S, F>(
    listener: TcpListener,
    state: AppState<S>,
    shutdown: F,
) -> std::io::Result<()>
where
    S: MailSender + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Control API listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
