//! Route handlers

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::{ContractError, DeliveryCredential, MailSender};
use dispatcher::{DispatchJob, JobStarted, StartOutcome};
use recipients::RecipientSheet;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::response::{json_error, status_only};
use crate::state::AppState;

fn default_delay_secs() -> f64 {
    5.0
}

fn default_min_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    100
}

/// Body of `POST /send`
#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    /// Recipient sheet readable by the server (`.csv`, `.xlsx`, `.xls`, `.ods`)
    pub sheet_path: PathBuf,
    /// Pacing delay after each successful delivery
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,
    /// First recipient row (1-based)
    #[serde(default = "default_min_limit")]
    pub min_limit: usize,
    /// Last recipient row (1-based, inclusive)
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

/// Credential as listed by `GET /config`, secret redacted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialView {
    pub sender_email: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_name: Option<String>,
    pub has_password: bool,
}

impl From<&DeliveryCredential> for CredentialView {
    fn from(credential: &DeliveryCredential) -> Self {
        Self {
            sender_email: credential.sender_email.clone(),
            smtp_server: credential.smtp_server.clone(),
            smtp_port: credential.smtp_port,
            sender_name: credential.sender_name.clone(),
            has_password: credential.secret().is_some(),
        }
    }
}

#[derive(Serialize)]
struct StartedBody {
    status: &'static str,
    #[serde(flatten)]
    job: JobStarted,
}

pub(crate) async fn health() -> Response {
    status_only("ok")
}

pub(crate) async fn pause<S>(State(state): State<AppState<S>>) -> Response
where
    S: MailSender + Sync + 'static,
{
    state.control.pause();
    status_only("paused")
}

pub(crate) async fn resume<S>(State(state): State<AppState<S>>) -> Response
where
    S: MailSender + Sync + 'static,
{
    state.control.resume();
    status_only("resumed")
}

pub(crate) async fn stop<S>(State(state): State<AppState<S>>) -> Response
where
    S: MailSender + Sync + 'static,
{
    state.control.request_stop();
    status_only("stopped")
}

pub(crate) async fn progress<S>(State(state): State<AppState<S>>) -> Response
where
    S: MailSender + Sync + 'static,
{
    Json(state.control.progress()).into_response()
}

pub(crate) async fn status<S>(State(state): State<AppState<S>>) -> Response
where
    S: MailSender + Sync + 'static,
{
    Json(state.control.status()).into_response()
}

pub(crate) async fn send<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Response
where
    S: MailSender + Sync + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let Some(delay) = pacing_delay(request.delay_secs) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "delay_secs must be a non-negative number of seconds",
        );
    };
    if state.control.is_active() {
        return status_only("already_running");
    }

    let store = Arc::clone(&state.store);
    let sheet_path = request.sheet_path.clone();
    let loaded = tokio::task::spawn_blocking(move || {
        let credentials = store.load()?;
        let sheet = RecipientSheet::load_from_path(&sheet_path)?;
        Ok::<_, ContractError>((credentials, sheet))
    })
    .await;

    let (credentials, sheet) = match loaded {
        Ok(Ok(inputs)) => inputs,
        Ok(Err(e)) => {
            warn!(error = %e, "Dispatch inputs unreadable");
            return json_error(StatusCode::BAD_REQUEST, e.to_string());
        }
        Err(e) => {
            error!(error = %e, "Input loading task failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to load inputs");
        }
    };

    let job = DispatchJob {
        credentials,
        recipients: Arc::new(sheet),
        delay,
        min_index: request.min_limit,
        max_index: request.max_limit,
    };

    match state.control.start(job, Arc::clone(&state.sender)) {
        Ok(StartOutcome::Started(job)) => {
            info!(
                sheet = %request.sheet_path.display(),
                total_target = job.total_target,
                "Dispatch started via API"
            );
            (
                StatusCode::ACCEPTED,
                Json(StartedBody {
                    status: "started",
                    job,
                }),
            )
                .into_response()
        }
        Ok(StartOutcome::AlreadyRunning) => status_only("already_running"),
        Err(e) => {
            warn!(error = %e, "Dispatch rejected");
            json_error(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

pub(crate) async fn list_credentials<S>(State(state): State<AppState<S>>) -> Response
where
    S: MailSender + Sync + 'static,
{
    let store = Arc::clone(&state.store);
    match tokio::task::spawn_blocking(move || store.load()).await {
        Ok(Ok(credentials)) => {
            let views: Vec<CredentialView> = credentials.iter().map(CredentialView::from).collect();
            Json(views).into_response()
        }
        Ok(Err(e)) => {
            error!(error = %e, "Credential document unreadable");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Credential loading task failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to load credentials")
        }
    }
}

pub(crate) async fn add_credential<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<DeliveryCredential>, JsonRejection>,
) -> Response
where
    S: MailSender + Sync + 'static,
{
    let credential = match payload {
        Ok(Json(credential)) => normalize(credential),
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let store = Arc::clone(&state.store);
    match tokio::task::spawn_blocking(move || store.append(credential)).await {
        Ok(Ok(count)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "status": "saved", "credentials": count })),
        )
            .into_response(),
        Ok(Err(e @ ContractError::ConfigValidation { .. })) => {
            json_error(StatusCode::BAD_REQUEST, e.to_string())
        }
        Ok(Err(e)) => {
            error!(error = %e, "Credential append failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Credential append task failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to save credential")
        }
    }
}

/// Negative, non-finite and out-of-range values have no `Duration`
fn pacing_delay(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}

/// Trim form-style input; blank optional fields become absent
fn normalize(mut credential: DeliveryCredential) -> DeliveryCredential {
    credential.sender_email = credential.sender_email.trim().to_string();
    credential.smtp_server = credential.smtp_server.trim().to_string();
    credential.sender_name = credential
        .sender_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    credential.sender_password = credential
        .sender_password
        .map(|secret| secret.trim().to_string())
        .filter(|secret| !secret.is_empty());
    credential
}
