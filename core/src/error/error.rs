use thiserror::Error;

use super::{CatalogError, ExecuteError, ResolveError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    #[error("execution rejected: {0}")]
    Execute(#[from] ExecuteError),
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Rejected controller-state transitions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error("task '{task_id}' has no advanced option '{key}'")]
    UnknownOption { task_id: String, key: String },
    #[error("invalid value for '{key}': {reason}")]
    InvalidOptionValue { key: String, reason: String },
    #[error("resolution for '{task_id}' was derived from different input")]
    StaleResolution { task_id: String },
    #[error("task '{0}' does not accept job references")]
    NotResolvable(String),
}
