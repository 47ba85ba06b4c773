//! Persisted task configuration: ordered task list, per-category task maps and the schedule.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

/// Configuration type key used for the task configuration document.
pub const TASK_CONFIG_KEY: &str = "tasks";

pub const CURRENT_SCHEMA_VERSION: u64 = 1;

pub const DEFAULT_SCHEDULE_TIMES: [&str; 3] = ["08:00", "14:00", "20:00"];

fn default_schedule_times() -> Vec<String> {
    DEFAULT_SCHEDULE_TIMES.iter().map(|s| s.to_string()).collect()
}

/// Keyed configuration storage collaborator.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    fn name(&self) -> &str;
    async fn load(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn save(&self, key: &str, data: &Value) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfiguration {
    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub task_list: Vec<String>,

    #[serde(default)]
    pub category_tasks: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub schedule_enabled: bool,

    #[serde(default = "default_schedule_times")]
    pub schedule_times: Vec<String>,

    /// Fields this version does not know about; written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TaskConfiguration {
    fn default() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            task_list: Vec::new(),
            category_tasks: BTreeMap::new(),
            schedule_enabled: false,
            schedule_times: default_schedule_times(),
            extra: Map::new(),
        }
    }
}

/// Bring a stored task configuration up to [`CURRENT_SCHEMA_VERSION`].
///
/// Returns the migrated document and whether anything changed. Running it again on its own output
/// changes nothing, and fields it does not know about are kept.
pub fn migrate_task_config(mut value: Value) -> (Value, bool) {
    let Some(obj) = value.as_object_mut() else {
        return (value, false);
    };

    let version = obj.get("version").and_then(Value::as_u64).unwrap_or(0);
    if version >= CURRENT_SCHEMA_VERSION {
        return (value, false);
    }

    // v0 -> v1: schedule fields
    obj.entry("scheduleEnabled").or_insert(Value::Bool(false));
    obj.entry("scheduleTimes")
        .or_insert_with(|| Value::from(default_schedule_times()));
    obj.insert("version".to_string(), Value::from(CURRENT_SCHEMA_VERSION));

    (value, true)
}

/// Hydrated task configuration bound to its backing store.
pub struct ConfigurationStore {
    store: Arc<dyn ConfigStore>,
    config: TaskConfiguration,
}

impl ConfigurationStore {
    /// Load the task configuration, migrating it once. A migrated document is saved back.
    pub async fn hydrate(store: Arc<dyn ConfigStore>) -> anyhow::Result<Self> {
        let Some(raw) = store.load(TASK_CONFIG_KEY).await? else {
            tracing::debug!(
                target: "maactl.config_store",
                stage = "config_store.hydrate.empty",
                store = %store.name()
            );
            return Ok(Self {
                store,
                config: TaskConfiguration::default(),
            });
        };

        let from_version = raw.get("version").and_then(Value::as_u64).unwrap_or(0);
        let (migrated, changed) = migrate_task_config(raw);
        let config: TaskConfiguration = serde_json::from_value(migrated.clone())?;

        if changed {
            tracing::info!(
                target: "maactl.config_store",
                stage = "config_store.migrate",
                from_version,
                to_version = CURRENT_SCHEMA_VERSION
            );
            store.save(TASK_CONFIG_KEY, &migrated).await?;
        }

        Ok(Self { store, config })
    }

    pub fn config(&self) -> &TaskConfiguration {
        &self.config
    }

    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut TaskConfiguration),
    {
        f(&mut self.config);
    }

    pub async fn persist(&self) -> anyhow::Result<()> {
        let data = serde_json::to_value(&self.config)?;
        self.store.save(TASK_CONFIG_KEY, &data).await?;
        tracing::debug!(
            target: "maactl.config_store",
            stage = "config_store.persist",
            store = %self.store.name(),
            tasks = self.config.task_list.len()
        );
        Ok(())
    }
}

/// In-process store, used when no remote endpoint is configured.
#[derive(Default)]
pub struct MemoryConfigStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, data: Value) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), data);
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, data: &Value) -> anyhow::Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), data.clone());
        Ok(())
    }
}
