//! Controller and configuration state.
//!
//! [`ControllerState`] owns what the user typed and toggled; the coordinator and composer only
//! read it. [`ConfigurationStore`] holds the persisted task configuration behind a keyed store.

pub mod controller;
pub mod settings;

pub use controller::ControllerState;
pub use settings::{
    migrate_task_config, ConfigStore, ConfigurationStore, MemoryConfigStore, TaskConfiguration,
    CURRENT_SCHEMA_VERSION, DEFAULT_SCHEDULE_TIMES, TASK_CONFIG_KEY,
};
