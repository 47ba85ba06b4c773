//! CLI assembly: applies per-invocation overrides, turns task arguments into controller state and
//! renders results in the selected output format.
use maactl_core::api as core_api;
use serde::Serialize;

use crate::commands::cli::{Args, OutputFormat, TaskArgs};
use crate::utils::{join_inputs, parse_set_pairs};

/// Configuration with command-line overrides applied.
pub fn effective_config(args: &Args, cfg: &core_api::AppConfig) -> core_api::AppConfig {
    let mut cfg = cfg.clone();
    if let Some(url) = args.server_url.as_deref().filter(|u| !u.trim().is_empty()) {
        cfg.server.base_url = url.trim().to_string();
    }
    cfg
}

/// Build the controller state for one task from its command-line arguments.
///
/// With `--resolve`, the joined input is resolved through `resolver` and bound to the task before
/// anything is composed.
#[tracing::instrument(name = "cli.prepare_state", skip_all, fields(task_id = %args.task))]
pub async fn prepare_state(
    catalog: &core_api::Catalog,
    args: &TaskArgs,
    resolver: Option<&core_api::ReferenceResolver>,
) -> Result<core_api::ControllerState, core_api::CliError> {
    let task = catalog
        .task(&args.task)
        .ok_or_else(|| core_api::StateError::UnknownTask(args.task.clone()))?;

    let mut state = core_api::ControllerState::new();
    state.set_input(&task.id, join_inputs(&args.input));

    if args.dry_run {
        if !task.supports_dry_run {
            tracing::warn!(
                target: "maactl.cli",
                stage = "cli.dry_run.unsupported",
                task_id = %task.id,
                "task does not support dry-run; flag ignored"
            );
        }
        state.set_dry_run(&task.id, true);
    }

    for (key, raw) in parse_set_pairs(&args.set)? {
        state.set_advanced_text(catalog, &task.id, &key, &raw)?;
    }

    if args.resolve {
        if !task.input.is_resolvable() {
            return Err(core_api::StateError::NotResolvable(task.id.clone()).into());
        }
        let resolver = resolver.ok_or_else(|| {
            core_api::CliError::Config("reference resolver unavailable".to_string())
        })?;
        let input = state.input(&task.id).to_string();
        let resolution = resolver.resolve(&input).await?;
        state.bind_resolution(catalog, &task.id, resolution)?;
    }

    Ok(state)
}

/// Print `value` as JSON, or `text()` for the text format.
pub fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> Result<(), core_api::CliError>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match format {
        OutputFormat::Json => {
            let out = serde_json::to_string_pretty(value)
                .map_err(|e| core_api::CliError::Command(format!("encode output: {e}")))?;
            println!("{out}");
        }
        OutputFormat::Text => println!("{}", text()),
    }
    Ok(())
}

/// Human-readable lines for a resolution.
pub fn describe_resolution(resolution: &core_api::ReferenceResolution) -> String {
    match &resolution.outcome {
        core_api::ResolutionOutcome::Single { summary } => {
            let mut out = format!(
                "maa://{} single job\n  title: {}\n  stage: {}",
                resolution.job_id, summary.title, summary.stage
            );
            if !summary.participants.is_empty() {
                out.push_str(&format!("\n  operators: {}", summary.participants.join(", ")));
            }
            out
        }
        core_api::ResolutionOutcome::Collection {
            note,
            auto_add_suffix,
        } => {
            let mut out = format!("maa://{} job set\n  {}", resolution.job_id, note);
            if *auto_add_suffix {
                out.push_str("\n  the collection suffix will be added when composing");
            }
            out
        }
    }
}
