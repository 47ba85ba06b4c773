use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use maactl_core::api::ConfigStore;
use serde_json::Value;

/// One pretty-printed JSON document per configuration type.
pub struct FileConfigStore {
    directory: PathBuf,
}

impl FileConfigStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// `~/.maactl/config`
    pub fn default_directory() -> Result<PathBuf> {
        let home = dirs::home_dir().context("cannot determine home directory")?;
        Ok(home.join(".maactl").join("config"))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            anyhow::bail!("invalid config type: {key:?}");
        }
        Ok(self.directory.join(format!("{key}.json")))
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    async fn save(&self, key: &str, data: &Value) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("failed to create {}", self.directory.display()))?;

        // Replace atomically through a sibling temp file.
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(data)?;
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;

        tracing::debug!(
            target: "maactl.config_store",
            stage = "config_store.file.save",
            path = %path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path());
        assert_eq!(store.load("tasks").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("nested"));
        let doc = json!({ "version": 1, "taskList": ["startup", "fight"] });
        store.save("tasks", &doc).await.unwrap();
        assert_eq!(store.load("tasks").await.unwrap(), Some(doc));
        assert!(!dir.path().join("nested").join("tasks.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path());
        assert!(store.load("../tasks").await.is_err());
        assert!(store.save("", &json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tasks.json"), "{ nope").unwrap();
        let store = FileConfigStore::new(dir.path());
        let err = store.load("tasks").await.unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
