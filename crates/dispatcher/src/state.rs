//! Shared job state and its read-only snapshots

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::window::DispatchWindow;

/// Observable job phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// No job has run yet
    #[default]
    Idle,
    Running,
    /// Running, but waiting for resume
    Paused,
    /// Ended early on a stop request
    Stopped,
    /// Reached the end of its window
    Completed,
}

impl JobPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            JobPhase::Idle => "idle",
            JobPhase::Running => "running",
            JobPhase::Paused => "paused",
            JobPhase::Stopped => "stopped",
            JobPhase::Completed => "completed",
        }
    }
}

/// The single mutable aggregate shared by engine and control callers
///
/// The engine writes cursor / counters / running / outcome; control
/// operations write `paused` and `stop_requested`.
#[derive(Debug, Clone, Default)]
pub(crate) struct JobState {
    pub cursor: usize,
    pub total_target: u64,
    pub sent_count: u64,
    pub failed_count: u64,
    pub skipped_count: u64,
    pub paused: bool,
    pub stop_requested: bool,
    pub running: bool,
    /// Terminal phase of the last finished job
    pub outcome: Option<JobPhase>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobState {
    /// Fresh state for a job over `window`
    pub fn begin(window: &DispatchWindow, now: DateTime<Utc>) -> Self {
        Self {
            cursor: window.start_cursor(),
            total_target: window.total_target(),
            running: true,
            started_at: Some(now),
            ..Default::default()
        }
    }

    pub fn phase(&self) -> JobPhase {
        match (self.running, self.paused) {
            (true, true) => JobPhase::Paused,
            (true, false) => JobPhase::Running,
            (false, _) => self.outcome.unwrap_or_default(),
        }
    }

    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_emails: self.total_target,
            sent_emails: self.sent_count,
        }
    }

    pub fn status(&self) -> JobStatus {
        JobStatus {
            phase: self.phase(),
            cursor: self.cursor,
            total_target: self.total_target,
            sent_count: self.sent_count,
            failed_count: self.failed_count,
            skipped_count: self.skipped_count,
            paused: self.paused,
            stop_requested: self.stop_requested,
            running: self.running,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

/// Progress counters, as served to status pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressSnapshot {
    pub total_emails: u64,
    pub sent_emails: u64,
}

/// Full point-in-time view of the job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatus {
    pub phase: JobPhase,
    pub cursor: usize,
    pub total_target: u64,
    pub sent_count: u64,
    pub failed_count: u64,
    pub skipped_count: u64,
    pub paused: bool,
    pub stop_requested: bool,
    pub running: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle_zero() {
        let state = JobState::default();
        assert_eq!(state.phase(), JobPhase::Idle);
        assert_eq!(state.progress(), ProgressSnapshot::default());
    }

    #[test]
    fn test_begin_positions_cursor() {
        let window = DispatchWindow::normalize(10, 50, 100);
        let state = JobState::begin(&window, Utc::now());
        assert_eq!(state.cursor, 9);
        assert_eq!(state.total_target, 41);
        assert_eq!(state.phase(), JobPhase::Running);
    }

    #[test]
    fn test_paused_phase_only_while_running() {
        let mut state = JobState {
            running: true,
            paused: true,
            ..Default::default()
        };
        assert_eq!(state.phase(), JobPhase::Paused);

        state.running = false;
        state.outcome = Some(JobPhase::Stopped);
        assert_eq!(state.phase(), JobPhase::Stopped);
    }

    #[test]
    fn test_progress_serializes_with_wire_names() {
        let json = serde_json::to_value(ProgressSnapshot {
            total_emails: 41,
            sent_emails: 3,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"total_emails": 41, "sent_emails": 3}));
    }
}
