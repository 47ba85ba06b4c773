//! ServicesFactory implementation: builds the backend, lookup and config store from configuration
//! so every CLI command shares one construction path.
use async_trait::async_trait;
use maactl_core::api::{AppConfig, CliError, Services, ServicesFactory};

use crate::factory;

pub struct PluginServicesFactory;

impl Default for PluginServicesFactory {
    fn default() -> Self {
        Self
    }
}

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, CliError> {
        let backend = factory::build_backend(cfg)?;
        let lookup = factory::build_lookup(cfg)?;
        let store = factory::build_store(cfg)?;
        tracing::debug!(
            target: "maactl.services",
            stage = "services.build",
            backend = %backend.name(),
            lookup = %lookup.name(),
            store = %store.name()
        );
        Ok(Services {
            backend,
            lookup,
            store,
        })
    }
}
