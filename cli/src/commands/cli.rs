use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "maactl", version, about = "Control surface for the MAA automation engine")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Override `server.base_url` for this invocation.
    #[arg(long, global = true)]
    pub server_url: Option<String>,
}

/// Input and option state for one task.
#[derive(ClapArgs, Debug, Clone)]
pub struct TaskArgs {
    /// Task identifier from `maactl tasks`.
    pub task: String,

    /// Raw task input. Repeat for several job references (one per line).
    #[arg(long, action = clap::ArgAction::Append)]
    pub input: Vec<String>,

    /// Advanced option as KEY=VALUE, typed through the task's option schema.
    /// Can be specified multiple times.
    #[arg(long = "set", action = clap::ArgAction::Append)]
    pub set: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Resolve the input as a job reference first and bind the result.
    #[arg(long, default_value_t = false)]
    pub resolve: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub task: TaskArgs,

    /// Stay attached until the status message clears.
    #[arg(long, default_value_t = false)]
    pub follow: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ResolveArgs {
    /// Job reference, e.g. maa://1234 or maa://1234s
    pub reference: String,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print the hydrated task configuration.
    Show,
    /// Load, migrate and save the task configuration.
    Migrate,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the task catalog by category.
    Tasks,
    /// Print the argument string a task would be sent with.
    Compose(TaskArgs),
    Resolve(ResolveArgs),
    /// Execute a task through the control server.
    Run(RunArgs),
    Config(ConfigArgs),
}
