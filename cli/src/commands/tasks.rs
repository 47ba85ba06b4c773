use maactl_core::api as core_api;

use crate::app::emit;
use crate::commands::cli::OutputFormat;

pub fn handle(
    ctx: &core_api::AppContext,
    format: OutputFormat,
) -> Result<i32, core_api::CliError> {
    let catalog = ctx.catalog();
    emit(format, &catalog.categories(), || render(&catalog))?;
    Ok(0)
}

fn render(catalog: &core_api::Catalog) -> String {
    let mut out = Vec::new();
    for category in catalog.categories() {
        out.push(format!("{} ({})", category.name, category.id));
        if !category.description.is_empty() {
            out.push(format!("  {}", category.description));
        }
        for task in &category.tasks {
            let mut line = format!("  {:<16} {}", task.id, task.name);
            if task.supports_dry_run {
                line.push_str(" [dry-run]");
            }
            if task.input.is_resolvable() {
                line.push_str(" [resolve]");
            }
            out.push(line);
            for option in &task.options {
                let default = option
                    .display_value(None)
                    .map(|v| format!(" (default {v})"))
                    .unwrap_or_default();
                out.push(format!(
                    "      {:<22} {}{}",
                    option.flag, option.label, default
                ));
            }
        }
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_tasks_and_select_defaults() {
        let catalog = core_api::Catalog::builtin().unwrap();
        let text = render(&catalog);
        assert!(text.contains("copilot"));
        assert!(text.contains("--series"));
        assert!(text.contains("(default 1)"));
        assert!(!text.contains("award"));
    }
}
