use maactl_core::api as core_api;
use serde_json::json;

use crate::app::emit;
use crate::commands::cli::{ConfigAction, ConfigArgs, OutputFormat};

pub async fn handle(
    ctx: &core_api::AppContext,
    args: ConfigArgs,
    format: OutputFormat,
) -> Result<i32, core_api::CliError> {
    let services = ctx.build_services().await?;
    match args.action {
        ConfigAction::Show => {
            let hydrated = core_api::ConfigurationStore::hydrate(services.store.clone()).await?;
            let config = hydrated.config();
            emit(format, config, || {
                serde_json::to_string_pretty(config).unwrap_or_default()
            })?;
        }
        ConfigAction::Migrate => {
            let store = services.store.clone();
            let Some(raw) = store.load(core_api::TASK_CONFIG_KEY).await? else {
                emit(format, &json!({ "migrated": false, "reason": "empty" }), || {
                    format!("no task configuration in {} store", store.name())
                })?;
                return Ok(0);
            };
            let from = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0);
            let (migrated, changed) = core_api::migrate_task_config(raw);
            if changed {
                store.save(core_api::TASK_CONFIG_KEY, &migrated).await?;
            }
            let to = migrated.get("version").and_then(|v| v.as_u64()).unwrap_or(from);
            emit(
                format,
                &json!({ "migrated": changed, "from": from, "to": to }),
                || {
                    if changed {
                        format!("task configuration migrated v{from} -> v{to}")
                    } else {
                        format!("task configuration already at v{from}")
                    }
                },
            )?;
        }
    }
    Ok(0)
}
