use thiserror::Error;

/// Reasons an `execute` call is refused before anything is sent to the backend.
///
/// Backend-reported and transport failures are not errors here; they are reported through
/// [`crate::coordinator::RunResult`] and the status channel.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("another task is already running")]
    AlreadyRunning,

    #[error("unknown task: {0}")]
    UnknownTask(String),
}
