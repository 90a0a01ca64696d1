//! JobControl - the concurrency-safe control/status surface
//!
//! One lock guards the whole `JobState`; it is only ever held for field
//! reads/writes, never across a delivery or a sleep. A `Notify` wakes the
//! engine whenever a control flag changes.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use contracts::{DeliveryCredential, MailSender, RecipientSource};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::engine::{DispatchEngine, JobReport};
use crate::error::DispatchError;
use crate::rotator::CredentialRotator;
use crate::state::{JobPhase, JobState, JobStatus, ProgressSnapshot};
use crate::window::DispatchWindow;

/// Everything needed to run one job
#[derive(Clone)]
pub struct DispatchJob {
    /// Credentials in rotation order
    pub credentials: Vec<DeliveryCredential>,
    pub recipients: Arc<dyn RecipientSource>,
    /// Pacing delay after each successful delivery
    pub delay: Duration,
    /// Requested first recipient (1-based, inclusive)
    pub min_index: usize,
    /// Requested last recipient (1-based, inclusive)
    pub max_index: usize,
}

/// Acknowledgement for a started job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobStarted {
    pub window: DispatchWindow,
    pub total_target: u64,
    pub credentials: usize,
}

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(JobStarted),
    /// A job is still active; nothing was changed
    AlreadyRunning,
}

/// Gate decision at an engine check point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    Proceed,
    Stop,
}

struct ControlInner {
    state: Mutex<JobState>,
    changed: Notify,
    worker: Mutex<Option<JoinHandle<JobReport>>>,
}

/// Handle to the (single) dispatch job
///
/// Cheap to clone; all clones observe the same job.
#[derive(Clone)]
pub struct JobControl {
    inner: Arc<ControlInner>,
}

impl Default for JobControl {
    fn default() -> Self {
        Self::new()
    }
}

impl JobControl {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ControlInner {
                state: Mutex::new(JobState::default()),
                changed: Notify::new(),
                worker: Mutex::new(None),
            }),
        }
    }

    /// Pause before the next recipient. Idempotent.
    pub fn pause(&self) {
        self.update(|state| state.paused = true);
        info!("Pause requested");
    }

    /// Clear the pause flag. Idempotent.
    pub fn resume(&self) {
        self.update(|state| state.paused = false);
        info!("Resume requested");
    }

    /// Ask the engine to stop at its next check point. Idempotent.
    ///
    /// Best effort: an in-flight delivery attempt is allowed to finish.
    pub fn request_stop(&self) {
        self.update(|state| state.stop_requested = true);
        info!("Stop requested");
    }

    /// Counter snapshot; zeros before any job has started
    pub fn progress(&self) -> ProgressSnapshot {
        self.lock_state().progress()
    }

    /// Full state snapshot
    pub fn status(&self) -> JobStatus {
        self.lock_state().status()
    }

    /// Whether a job is running and its worker task is still alive
    pub fn is_active(&self) -> bool {
        let worker = self.lock_worker();
        self.is_active_with(&worker)
    }

    /// Launch a job unless one is already active
    ///
    /// Preconditions are checked before any state is touched, so a rejected
    /// start leaves the previous job's state intact.
    ///
    /// # Errors
    /// - `NoCredentials` when the credential list is empty
    /// - `EmptySource` when the recipient source has no rows
    #[instrument(
        name = "job_control_start",
        skip(self, job, sender),
        fields(
            sender = %sender.name(),
            credentials = job.credentials.len(),
            rows = job.recipients.len()
        )
    )]
    pub fn start<S>(&self, job: DispatchJob, sender: Arc<S>) -> Result<StartOutcome, DispatchError>
    where
        S: MailSender + Sync + 'static,
    {
        let mut worker = self.lock_worker();
        if self.is_active_with(&worker) {
            warn!("Dispatch job already active, start ignored");
            return Ok(StartOutcome::AlreadyRunning);
        }

        if job.recipients.is_empty() {
            return Err(DispatchError::EmptySource);
        }
        let rotator = CredentialRotator::new(job.credentials)?;
        let window = DispatchWindow::normalize(job.min_index, job.max_index, job.recipients.len());

        *self.lock_state() = JobState::begin(&window, Utc::now());
        observability::record_job_started(window.total_target());

        let started = JobStarted {
            window,
            total_target: window.total_target(),
            credentials: rotator.len(),
        };
        let engine = DispatchEngine::new(
            self.clone(),
            sender,
            job.recipients,
            rotator,
            window,
            job.delay,
        );
        *worker = Some(tokio::spawn(engine.run()));

        info!(
            min_index = window.min_index,
            max_index = window.max_index,
            total_target = started.total_target,
            delay_ms = job.delay.as_millis() as u64,
            "Dispatch job started"
        );
        Ok(StartOutcome::Started(started))
    }

    /// Wait for the current worker and return its report
    ///
    /// Returns `None` when no worker is attached or it terminated abnormally.
    pub async fn join(&self) -> Option<JobReport> {
        let handle = self.lock_worker().take()?;
        match handle.await {
            Ok(report) => Some(report),
            Err(e) => {
                error!(error = %e, "Dispatch worker terminated abnormally");
                self.update(|state| {
                    state.running = false;
                    state.outcome = Some(JobPhase::Stopped);
                    state.finished_at = Some(Utc::now());
                });
                None
            }
        }
    }
}

// Engine-side operations
impl JobControl {
    /// Check point before each recipient
    ///
    /// Returns `Stop` if a stop was requested; otherwise waits (lock released)
    /// while paused.
    pub(crate) async fn checkpoint(&self) -> Gate {
        let mut waiting = false;
        loop {
            let notified = self.inner.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let (paused, stop_requested) = {
                let state = self.lock_state();
                (state.paused, state.stop_requested)
            };
            if stop_requested {
                return Gate::Stop;
            }
            if !paused {
                if waiting {
                    info!("Dispatch resumed");
                }
                return Gate::Proceed;
            }
            if !waiting {
                info!("Dispatch paused, waiting for resume or stop");
                waiting = true;
            }
            notified.await;
        }
    }

    /// Pacing delay, cut short by a stop request
    pub(crate) async fn pace(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            let notified = self.inner.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let stop_requested = self.lock_state().stop_requested;
            if stop_requested {
                return;
            }
            tokio::select! {
                _ = &mut sleep => return,
                _ = notified.as_mut() => {}
            }
        }
    }

    /// Recipient at `cursor - 1` had no address
    pub(crate) fn record_skip(&self, cursor: usize) {
        self.update_quiet(|state| {
            state.cursor = cursor;
            state.skipped_count += 1;
        });
    }

    /// Recipient at `cursor - 1` was delivered
    pub(crate) fn record_sent(&self, cursor: usize) {
        self.update_quiet(|state| {
            state.cursor = cursor;
            state.sent_count += 1;
        });
    }

    /// Delivery to the recipient at `cursor - 1` failed
    pub(crate) fn record_failed(&self, cursor: usize) {
        self.update_quiet(|state| {
            state.cursor = cursor;
            state.failed_count += 1;
        });
    }

    /// Mark the job finished with a terminal phase
    pub(crate) fn finish(&self, outcome: JobPhase) {
        self.update(|state| {
            state.running = false;
            state.outcome = Some(outcome);
            state.finished_at = Some(Utc::now());
        });
    }
}

impl JobControl {
    fn lock_state(&self) -> MutexGuard<'_, JobState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<JoinHandle<JobReport>>> {
        self.inner
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_active_with(&self, worker: &Option<JoinHandle<JobReport>>) -> bool {
        let running = self.lock_state().running;
        running && worker.as_ref().is_none_or(|handle| !handle.is_finished())
    }

    /// Mutate state and wake the engine
    fn update(&self, mutate: impl FnOnce(&mut JobState)) {
        self.update_quiet(mutate);
        self.inner.changed.notify_waiters();
    }

    /// Mutate state without waking anyone
    fn update_quiet(&self, mutate: impl FnOnce(&mut JobState)) {
        let mut state = self.lock_state();
        mutate(&mut state);
    }
}
