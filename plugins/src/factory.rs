use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use maactl_core::api::{AppConfig, ConfigStore, ExecutionBackend, JobLookup, StoreConfig};

use crate::backend::HttpExecutionBackend;
use crate::http_client::HttpClient;
use crate::lookup::HttpJobLookup;
use crate::store::{FileConfigStore, HttpConfigStore};

pub fn build_client(cfg: &AppConfig) -> Result<HttpClient> {
    HttpClient::with_lookup_base(
        cfg.server.base_url.clone(),
        cfg.lookup_base_url().to_string(),
        cfg.server.api_key.clone(),
        cfg.server.timeout_ms,
    )
}

pub fn build_backend(cfg: &AppConfig) -> Result<Arc<dyn ExecutionBackend>> {
    Ok(Arc::new(HttpExecutionBackend::new(build_client(cfg)?)))
}

/// Lookups get their own client so `lookup.timeout_ms` applies.
pub fn build_lookup(cfg: &AppConfig) -> Result<Arc<dyn JobLookup>> {
    let client = HttpClient::with_lookup_base(
        cfg.server.base_url.clone(),
        cfg.lookup_base_url().to_string(),
        cfg.server.api_key.clone(),
        cfg.lookup.timeout_ms,
    )?;
    Ok(Arc::new(HttpJobLookup::new(client)))
}

pub fn build_store(cfg: &AppConfig) -> Result<Arc<dyn ConfigStore>> {
    match &cfg.store {
        StoreConfig::Http => Ok(Arc::new(HttpConfigStore::new(build_client(cfg)?))),
        StoreConfig::File { directory } => {
            let directory = match directory.as_deref().map(str::trim) {
                Some(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => FileConfigStore::default_directory()?,
            };
            Ok(Arc::new(FileConfigStore::new(directory)))
        }
    }
}
