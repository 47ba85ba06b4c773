use thiserror::Error;

/// Load-time validation failures for the task catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate category ID: {0}")]
    DuplicateCategoryId(String),

    #[error("Duplicate task ID: {0}")]
    DuplicateTaskId(String),

    #[error("task '{0}' has an empty command")]
    EmptyCommand(String),

    #[error("task '{task_id}' declares option '{key}' more than once")]
    DuplicateOptionKey { task_id: String, key: String },

    #[error("task '{task_id}' has_advanced={has_advanced} but declares {options} option(s)")]
    AdvancedMismatch {
        task_id: String,
        has_advanced: bool,
        options: usize,
    },

    #[error("option '{key}' of task '{task_id}' has invalid flag '{flag}' (expected --long-form)")]
    InvalidFlag {
        task_id: String,
        key: String,
        flag: String,
    },

    #[error("select option '{key}' of task '{task_id}' declares no choices")]
    EmptyChoices { task_id: String, key: String },

    #[error("select option '{key}' of task '{task_id}' has no explicit default")]
    MissingSelectDefault { task_id: String, key: String },

    #[error("default '{default}' of select option '{key}' (task '{task_id}') is not a declared choice")]
    UnknownSelectDefault {
        task_id: String,
        key: String,
        default: String,
    },
}
