use maactl_core::api as core_api;
use serde::Serialize;

use crate::app::{emit, prepare_state};
use crate::commands::cli::{OutputFormat, TaskArgs};

#[derive(Debug, Serialize)]
struct ComposeOutput<'a> {
    task: &'a str,
    command: &'a str,
    arguments: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<&'a core_api::ReferenceResolution>,
}

pub async fn handle(
    ctx: &core_api::AppContext,
    args: TaskArgs,
    format: OutputFormat,
) -> Result<i32, core_api::CliError> {
    let catalog = ctx.catalog();
    let resolver = if args.resolve {
        let services = ctx.build_services().await?;
        Some(ctx.resolver(&services))
    } else {
        None
    };

    let state = prepare_state(&catalog, &args, resolver.as_ref()).await?;
    let arguments = state.compose(&catalog, &args.task)?;
    let task = catalog
        .task(&args.task)
        .ok_or_else(|| core_api::StateError::UnknownTask(args.task.clone()))?;

    let out = ComposeOutput {
        task: &task.id,
        command: &task.command,
        arguments,
        resolution: state.resolution(&task.id),
    };
    emit(format, &out, || {
        if out.arguments.is_empty() {
            out.command.to_string()
        } else {
            format!("{} {}", out.command, out.arguments)
        }
    })?;
    Ok(0)
}
