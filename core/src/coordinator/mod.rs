//! Execution coordinator.
//!
//! Runs at most one task at a time across the whole process. An accepted execution composes the
//! arguments, calls the backend once, publishes the outcome as a status message and then clears
//! the status and the running flag on two independent timers:
//!
//! ```text
//! execute ──► running=true, status=Executing
//!    │
//!    ▼
//! compose ──► backend.execute(command, arguments)
//!    │
//!    ├─ success ────────► status=Succeeded    (cleared after success_clear)
//!    ├─ success=false ──► status=Failed       (cleared after failure_clear)
//!    └─ Err ────────────► status=NetworkError (cleared after failure_clear)
//!    │
//!    ▼
//! running=false after running_clear
//! ```
//!
//! There are no retries and no cancellation: once accepted, an execution runs to completion on
//! its own task, even if the caller drops the `execute` future. A panicking backend is reported
//! as a network error.

mod run;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::{JoinError, JoinHandle};

use crate::backend::{CommandRequest, CommandResponse, ExecutionBackend};
use crate::catalog::Catalog;
use crate::compose::compose;
use crate::error::ExecuteError;
use crate::state::ControllerState;

pub use run::{
    ClearTimerPolicy, CoordinatorTiming, RunEvent, RunOutcome, RunResult, RunSnapshot,
    StatusKind, StatusMessage,
};
use run::ExecutionRun;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct ExecutionCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    catalog: Arc<Catalog>,
    backend: Arc<dyn ExecutionBackend>,
    timing: CoordinatorTiming,
    run: Mutex<ExecutionRun>,
    event_tx: broadcast::Sender<RunEvent>,
}

impl ExecutionCoordinator {
    pub fn new(
        catalog: Arc<Catalog>,
        backend: Arc<dyn ExecutionBackend>,
        timing: CoordinatorTiming,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(CoordinatorInner {
                catalog,
                backend,
                timing,
                run: Mutex::new(ExecutionRun::default()),
                event_tx,
            }),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.inner.event_tx.subscribe()
    }

    pub async fn snapshot(&self) -> RunSnapshot {
        self.inner.run.lock().await.snapshot.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.inner.run.lock().await.snapshot.running
    }

    /// Execute `task_id` with the arguments composed from `state`.
    ///
    /// Refused with [`ExecuteError::AlreadyRunning`] while another execution holds the running
    /// flag; a refused call sends nothing and changes nothing.
    #[tracing::instrument(name = "coordinator.execute", skip(self, state))]
    pub async fn execute(
        &self,
        state: &ControllerState,
        task_id: &str,
    ) -> Result<RunOutcome, ExecuteError> {
        let inner = &self.inner;
        let task = inner
            .catalog
            .task(task_id)
            .ok_or_else(|| ExecuteError::UnknownTask(task_id.to_string()))?;

        let executing = StatusMessage::executing(&task.id, &task.name);
        let generation = {
            let mut run = inner.run.lock().await;
            if run.snapshot.running {
                tracing::debug!(
                    target: "maactl.coordinator",
                    stage = "coordinator.execute.rejected",
                    task_id = %task_id,
                    active = ?run.snapshot.active_task
                );
                return Err(ExecuteError::AlreadyRunning);
            }
            if inner.timing.policy == ClearTimerPolicy::Cancel {
                run.cancel_timers();
            }
            run.generation += 1;
            run.snapshot.running = true;
            run.snapshot.active_task = Some(task.id.clone());
            run.snapshot.status = Some(executing.clone());
            run.generation
        };
        inner.emit(RunEvent::RunningChanged {
            running: true,
            at: Utc::now(),
        });
        inner.emit(RunEvent::StatusChanged { status: executing });

        let run_id = uuid::Uuid::new_v4().to_string();
        let arguments = compose(&state.compose_request(task));
        tracing::info!(
            target: "maactl.coordinator",
            stage = "coordinator.execute.in",
            run_id = %run_id,
            backend = %inner.backend.name(),
            command = %task.command,
            arguments = %arguments
        );

        let request = CommandRequest {
            command: task.command.clone(),
            arguments: arguments.clone(),
        };
        // The driver owns the rest of the run, so the clear timers are armed even when the
        // caller stops polling this future.
        let driver = {
            let coordinator = self.clone();
            let run_id = run_id.clone();
            let (task_id, task_name) = (task.id.clone(), task.name.clone());
            tokio::spawn(async move {
                let backend = coordinator.inner.backend.clone();
                let call = tokio::spawn(async move { backend.execute(request).await });
                let (result, status) = settle(&task_id, &task_name, call.await);
                tracing::info!(
                    target: "maactl.coordinator",
                    stage = "coordinator.execute.out",
                    run_id = %run_id,
                    status = ?status.kind,
                    message = %status.text
                );
                coordinator.finish(generation, status).await;
                result
            })
        };
        let result = driver.await.unwrap_or_else(|err| {
            tracing::error!(
                target: "maactl.coordinator",
                stage = "coordinator.execute.driver",
                run_id = %run_id,
                error = %err
            );
            RunResult::TransportFailed {
                error: format!("execution driver stopped: {err}"),
            }
        });

        Ok(RunOutcome {
            run_id,
            task_id: task.id.clone(),
            command: task.command.clone(),
            arguments,
            result,
        })
    }

    async fn finish(&self, generation: u64, status: StatusMessage) {
        let timing = self.inner.timing;
        let status_delay = status.kind.clear_delay(&timing);
        {
            let mut run = self.inner.run.lock().await;
            run.snapshot.status = Some(status.clone());
            run.status_timer = status_delay.map(|delay| self.spawn_status_clear(generation, delay));
            run.running_timer = Some(self.spawn_running_clear(generation, timing.running_clear));
        }
        self.inner.emit(RunEvent::StatusChanged { status });
    }

    fn spawn_status_clear(&self, generation: u64, delay: Duration) -> JoinHandle<()> {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.clear_status(generation).await;
        })
    }

    fn spawn_running_clear(&self, generation: u64, delay: Duration) -> JoinHandle<()> {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.clear_running(generation).await;
        })
    }
}

/// Map the joined backend call to the run result and its status message. A panicking backend
/// counts as a transport failure.
fn settle(
    task_id: &str,
    task_name: &str,
    joined: Result<anyhow::Result<CommandResponse>, JoinError>,
) -> (RunResult, StatusMessage) {
    match joined {
        Ok(Ok(resp)) if resp.success => (
            RunResult::Succeeded { data: resp.data },
            StatusMessage::succeeded(task_id, task_name),
        ),
        Ok(Ok(resp)) => {
            let error = resp
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "unknown error".to_string());
            let status = StatusMessage::failed(task_id, task_name, &error);
            (RunResult::BackendFailed { error }, status)
        }
        Ok(Err(err)) => {
            let error = err.to_string();
            let status = StatusMessage::network_error(task_id, &error);
            (RunResult::TransportFailed { error }, status)
        }
        Err(join) => {
            let error = format!("backend call aborted: {join}");
            let status = StatusMessage::network_error(task_id, &error);
            (RunResult::TransportFailed { error }, status)
        }
    }
}

impl CoordinatorInner {
    fn emit(&self, event: RunEvent) {
        let _ = self.event_tx.send(event);
    }

    fn is_stale(&self, run: &ExecutionRun, generation: u64) -> bool {
        self.timing.policy == ClearTimerPolicy::Cancel && run.generation != generation
    }

    async fn clear_status(&self, generation: u64) {
        {
            let mut run = self.run.lock().await;
            if self.is_stale(&run, generation) || run.snapshot.status.is_none() {
                return;
            }
            run.snapshot.status = None;
            run.status_timer = None;
        }
        self.emit(RunEvent::StatusCleared { at: Utc::now() });
    }

    async fn clear_running(&self, generation: u64) {
        {
            let mut run = self.run.lock().await;
            if self.is_stale(&run, generation) || !run.snapshot.running {
                return;
            }
            run.snapshot.running = false;
            run.snapshot.active_task = None;
            run.running_timer = None;
        }
        self.emit(RunEvent::RunningChanged {
            running: false,
            at: Utc::now(),
        });
    }
}
