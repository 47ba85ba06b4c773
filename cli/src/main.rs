use clap::Parser;
use maactl_cli::app;
use maactl_cli::commands::{self, cli};
use maactl_core::context::{AppContext, ServicesFactory};
use maactl_core::error;
use maactl_plugins::services::PluginServicesFactory;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, error::CliError> {
    let args = cli::Args::parse();
    let cfg =
        maactl_core::config::load_default().map_err(|e| error::CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(error::CliError::Command)?;

    let cfg = app::effective_config(&args, &cfg);
    spawn_version_probe(&cfg);

    let factory: Arc<dyn ServicesFactory> = Arc::new(PluginServicesFactory);
    let ctx = AppContext::new(cfg, Some(factory))?;
    dispatch(args, ctx).await
}

fn exit_code_for_error(e: &error::CliError) -> i32 {
    // 0: success
    // 11: config error
    // 12: catalog error
    // 13: invalid input (state transition, reference validation, lookup)
    // 20: execution rejected or failed
    // 50: internal/uncategorized
    match e {
        error::CliError::Config(_) => 11,
        error::CliError::Catalog(_) => 12,
        error::CliError::State(_) => 13,
        error::CliError::Resolve(_) => 13,
        error::CliError::Execute(_) => 20,
        error::CliError::Command(_) => 20,
        error::CliError::Io(_) => 50,
        error::CliError::Anyhow(_) => 50,
    }
}

async fn dispatch(args: cli::Args, ctx: AppContext) -> Result<i32, error::CliError> {
    let format = args.format;
    match args.command {
        cli::Commands::Tasks => commands::tasks::handle(&ctx, format),
        cli::Commands::Compose(task_args) => {
            commands::compose::handle(&ctx, task_args, format).await
        }
        cli::Commands::Resolve(resolve_args) => {
            commands::resolve::handle(&ctx, resolve_args, format).await
        }
        cli::Commands::Run(run_args) => commands::run::handle(&ctx, run_args, format).await,
        cli::Commands::Config(config_args) => {
            commands::config::handle(&ctx, config_args, format).await
        }
    }
}

/// Ask the control server for its version in the background. Failures are only logged.
fn spawn_version_probe(cfg: &maactl_core::config::AppConfig) {
    let client = match maactl_plugins::factory::build_client(cfg) {
        Ok(client) => client,
        Err(e) => {
            tracing::debug!(target: "maactl.cli", stage = "cli.version.skip", error = %e);
            return;
        }
    };
    tokio::spawn(async move {
        match client.fetch_version().await {
            Ok(version) => tracing::debug!(
                target: "maactl.cli",
                stage = "cli.version",
                version = version.as_deref().unwrap_or("unknown")
            ),
            Err(e) => tracing::debug!(target: "maactl.cli", stage = "cli.version.error", error = %e),
        }
    });
}

fn init_tracing(logging: &maactl_core::config::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("maactl"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("maactl.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
