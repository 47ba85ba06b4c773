//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `maactl_core::api` instead of reaching into internal modules.

pub use crate::backend::{CommandRequest, CommandResponse, ExecutionBackend};
pub use crate::catalog::{
    AdvancedValues, Catalog, InputMode, OptionKind, OptionSpec, OptionValue, SelectChoice,
    TaskCategory, TaskDefinition, TaskValues, BUILTIN_CATALOG,
};
pub use crate::compose::{compose, ComposeRequest, DEFAULT_FORMATION_FLAG, DRY_RUN_FLAG};
pub use crate::config::{
    get_maactl_data_dir, load_default, load_from_path, AppConfig, CatalogConfig,
    CoordinatorConfig, LoggingConfig, LookupConfig, ServerConfig, StoreConfig,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::coordinator::{
    ClearTimerPolicy, CoordinatorTiming, ExecutionCoordinator, RunEvent, RunOutcome, RunResult,
    RunSnapshot, StatusKind, StatusMessage,
};
pub use crate::error::{CatalogError, CliError, ExecuteError, ResolveError, StateError};
pub use crate::reference::{
    inject_collection_suffix, parse_job_document, JobLookup, JobLookupOutcome, JobReference,
    JobSummary, LookupFailurePolicy, ReferenceResolution, ReferenceResolver, ResolutionOutcome,
};
pub use crate::state::{
    migrate_task_config, ConfigStore, ConfigurationStore, ControllerState, MemoryConfigStore,
    TaskConfiguration, TASK_CONFIG_KEY,
};
