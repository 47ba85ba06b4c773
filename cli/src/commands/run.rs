use maactl_core::api as core_api;
use tokio::sync::broadcast::error::RecvError;

use crate::app::{emit, prepare_state};
use crate::commands::cli::{OutputFormat, RunArgs};

/// Exit code for an execution the backend or transport reported as failed.
pub const EXIT_EXECUTION_FAILED: i32 = 20;

pub async fn handle(
    ctx: &core_api::AppContext,
    args: RunArgs,
    format: OutputFormat,
) -> Result<i32, core_api::CliError> {
    let services = ctx.build_services().await?;
    let resolver = ctx.resolver(&services);
    let catalog = ctx.catalog();
    let state = prepare_state(&catalog, &args.task, Some(&resolver)).await?;

    let coordinator = ctx.coordinator(&services);
    let events = args.follow.then(|| coordinator.subscribe());

    let outcome = coordinator.execute(&state, &args.task.task).await?;
    let status = coordinator.snapshot().await.status;
    emit(format, &outcome, || {
        status
            .as_ref()
            .map(|s| s.text.clone())
            .unwrap_or_else(|| outcome.task_id.clone())
    })?;

    if let Some(mut rx) = events {
        follow_until_cleared(&mut rx).await;
    }

    Ok(if outcome.result.is_success() {
        0
    } else {
        EXIT_EXECUTION_FAILED
    })
}

/// Block until the trailing status message has been cleared or Ctrl-C is pressed.
async fn follow_until_cleared(rx: &mut tokio::sync::broadcast::Receiver<core_api::RunEvent>) {
    loop {
        let next = tokio::select! {
            next = rx.recv() => next,
            _ = tokio::signal::ctrl_c() => break,
        };
        match next {
            Ok(core_api::RunEvent::StatusCleared { .. }) | Err(RecvError::Closed) => break,
            Ok(event) => {
                tracing::debug!(target: "maactl.cli", stage = "cli.run.event", ?event);
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(target: "maactl.cli", stage = "cli.run.lagged", skipped);
            }
        }
    }
}
