use crate::backend::ExecutionBackend;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::coordinator::{CoordinatorTiming, ExecutionCoordinator};
use crate::error::CliError;
use crate::reference::{JobLookup, ReferenceResolver};
use crate::state::ConfigStore;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct Services {
    pub backend: Arc<dyn ExecutionBackend>,
    pub lookup: Arc<dyn JobLookup>,
    pub store: Arc<dyn ConfigStore>,
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, CliError>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    catalog: Arc<Catalog>,
    services_factory: Option<Arc<dyn ServicesFactory>>,
}

impl AppContext {
    pub fn new(
        cfg: AppConfig,
        services_factory: Option<Arc<dyn ServicesFactory>>,
    ) -> Result<Self, CliError> {
        let catalog = match cfg.catalog.path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => Catalog::load(Path::new(path))?,
            _ => Catalog::builtin()?,
        };
        Ok(Self {
            cfg,
            catalog: Arc::new(catalog),
            services_factory,
        })
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.clone()
    }

    pub async fn build_services(&self) -> Result<Services, CliError> {
        let Some(factory) = self.services_factory.as_ref() else {
            return Err(CliError::Config(
                "services_factory missing (cannot build backend/lookup/store)".into(),
            ));
        };
        factory.build_services(&self.cfg).await
    }

    pub fn coordinator(&self, services: &Services) -> ExecutionCoordinator {
        ExecutionCoordinator::new(
            self.catalog.clone(),
            services.backend.clone(),
            CoordinatorTiming::from(&self.cfg.coordinator),
        )
    }

    pub fn resolver(&self, services: &Services) -> ReferenceResolver {
        ReferenceResolver::new(services.lookup.clone(), self.cfg.lookup.failure_policy)
    }
}
