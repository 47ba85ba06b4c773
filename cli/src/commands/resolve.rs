use maactl_core::api as core_api;

use crate::app::{describe_resolution, emit};
use crate::commands::cli::{OutputFormat, ResolveArgs};

pub async fn handle(
    ctx: &core_api::AppContext,
    args: ResolveArgs,
    format: OutputFormat,
) -> Result<i32, core_api::CliError> {
    let services = ctx.build_services().await?;
    let resolver = ctx.resolver(&services);
    let resolution = resolver.resolve(&args.reference).await?;
    emit(format, &resolution, || describe_resolution(&resolution))?;
    Ok(0)
}
