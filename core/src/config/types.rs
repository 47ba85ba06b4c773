use serde::{Deserialize, Serialize};

use crate::reference::{LookupFailurePolicy, DEFAULT_LOOKUP_FAILURE_POLICY};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "maactl_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Control server that fronts the automation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_server_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

fn default_server_timeout_ms() -> u64 {
    120_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_server_url(),
            api_key: String::new(),
            timeout_ms: default_server_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Job-lookup endpoint base. Empty means "same as server.base_url".
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_lookup_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_failure_policy")]
    pub failure_policy: LookupFailurePolicy,
}

fn default_lookup_timeout_ms() -> u64 {
    10_000
}

fn default_failure_policy() -> LookupFailurePolicy {
    DEFAULT_LOOKUP_FAILURE_POLICY
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: default_lookup_timeout_ms(),
            failure_policy: default_failure_policy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_success_clear_ms")]
    pub success_clear_ms: u64,

    #[serde(default = "default_failure_clear_ms")]
    pub failure_clear_ms: u64,

    #[serde(default = "default_running_clear_ms")]
    pub running_clear_ms: u64,

    /// Abort pending clears when a new execution starts.
    #[serde(default = "default_cancel_stale_timers")]
    pub cancel_stale_timers: bool,
}

fn default_success_clear_ms() -> u64 {
    1_500
}

fn default_failure_clear_ms() -> u64 {
    2_000
}

fn default_running_clear_ms() -> u64 {
    1_000
}

fn default_cancel_stale_timers() -> bool {
    true
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            success_clear_ms: default_success_clear_ms(),
            failure_clear_ms: default_failure_clear_ms(),
            running_clear_ms: default_running_clear_ms(),
            cancel_stale_timers: default_cancel_stale_timers(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Replace the built-in catalog with this TOML file.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum StoreConfig {
    /// Keyed configuration endpoint on the control server.
    #[serde(rename = "http")]
    Http,
    /// JSON files under `directory` (default: ~/.maactl/config).
    #[serde(rename = "file")]
    File {
        #[serde(default)]
        directory: Option<String>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::File { directory: None }
    }
}

impl AppConfig {
    /// Lookup base URL, falling back to the server URL.
    pub fn lookup_base_url(&self) -> &str {
        let own = self.lookup.base_url.trim();
        if own.is_empty() {
            &self.server.base_url
        } else {
            own
        }
    }
}
