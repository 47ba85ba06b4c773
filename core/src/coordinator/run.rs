use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::config::CoordinatorConfig;

/// How pending status/running clears behave when a new execution starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearTimerPolicy {
    /// Abort pending clears and ignore clears from earlier runs.
    #[default]
    Cancel,
    /// Let earlier clears fire; a late clear may blank a newer status.
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorTiming {
    pub success_clear: Duration,
    pub failure_clear: Duration,
    pub running_clear: Duration,
    pub policy: ClearTimerPolicy,
}

impl Default for CoordinatorTiming {
    fn default() -> Self {
        Self::from(&CoordinatorConfig::default())
    }
}

impl From<&CoordinatorConfig> for CoordinatorTiming {
    fn from(cfg: &CoordinatorConfig) -> Self {
        Self {
            success_clear: Duration::from_millis(cfg.success_clear_ms),
            failure_clear: Duration::from_millis(cfg.failure_clear_ms),
            running_clear: Duration::from_millis(cfg.running_clear_ms),
            policy: if cfg.cancel_stale_timers {
                ClearTimerPolicy::Cancel
            } else {
                ClearTimerPolicy::Preserve
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Executing,
    Succeeded,
    Failed,
    NetworkError,
}

impl StatusKind {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Executing)
    }

    /// Delay after which a terminal status is cleared.
    pub fn clear_delay(self, timing: &CoordinatorTiming) -> Option<Duration> {
        match self {
            Self::Executing => None,
            Self::Succeeded => Some(timing.success_clear),
            Self::Failed | Self::NetworkError => Some(timing.failure_clear),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub task_id: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl StatusMessage {
    fn new(kind: StatusKind, task_id: &str, text: String) -> Self {
        Self {
            kind,
            task_id: task_id.to_string(),
            text,
            at: Utc::now(),
        }
    }

    pub fn executing(task_id: &str, task_name: &str) -> Self {
        Self::new(
            StatusKind::Executing,
            task_id,
            format!("Executing {task_name}..."),
        )
    }

    pub fn succeeded(task_id: &str, task_name: &str) -> Self {
        Self::new(
            StatusKind::Succeeded,
            task_id,
            format!("{task_name} completed"),
        )
    }

    pub fn failed(task_id: &str, task_name: &str, error: &str) -> Self {
        Self::new(
            StatusKind::Failed,
            task_id,
            format!("{task_name} failed: {error}"),
        )
    }

    pub fn network_error(task_id: &str, error: &str) -> Self {
        Self::new(
            StatusKind::NetworkError,
            task_id,
            format!("Network error: {error}"),
        )
    }
}

/// Point-in-time view of the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub active_task: Option<String>,
    pub status: Option<StatusMessage>,
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    StatusChanged { status: StatusMessage },
    StatusCleared { at: DateTime<Utc> },
    RunningChanged { running: bool, at: DateTime<Utc> },
}

/// What the backend did with one execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunResult {
    Succeeded { data: Option<serde_json::Value> },
    BackendFailed { error: String },
    TransportFailed { error: String },
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutcome {
    pub run_id: String,
    pub task_id: String,
    pub command: String,
    pub arguments: String,
    pub result: RunResult,
}

/// Mutable run state, owned by the coordinator.
#[derive(Debug, Default)]
pub(crate) struct ExecutionRun {
    pub(crate) snapshot: RunSnapshot,
    /// Bumped on every accepted execution; clears from older generations are stale.
    pub(crate) generation: u64,
    pub(crate) status_timer: Option<JoinHandle<()>>,
    pub(crate) running_timer: Option<JoinHandle<()>>,
}

impl ExecutionRun {
    pub(crate) fn cancel_timers(&mut self) {
        for handle in [self.status_timer.take(), self.running_timer.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }
    }
}
