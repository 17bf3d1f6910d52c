use std::sync::Arc;

use vitrine_core::{GenerationBackend, Result};
use vitrine_db::Database;
use vitrine_inference::FallbackChain;
use vitrine_jobs::{BackendSource, CycleConfig};
use vitrine_seo::Interlinker;

use crate::config::ApiConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
    backend: BackendSource,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
            backend: BackendSource::Settings,
        }
    }

    /// Use a fixed backend for on-demand generation (keyword expansion).
    pub fn with_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backend = BackendSource::Fixed(backend);
        self
    }

    pub fn backend_source(&self) -> BackendSource {
        self.backend.clone()
    }

    /// Backend for a request, built from the current settings unless fixed.
    pub async fn generation_backend(&self) -> Result<Arc<dyn GenerationBackend>> {
        match &self.backend {
            BackendSource::Fixed(backend) => Ok(backend.clone()),
            BackendSource::Settings => {
                let cfg = CycleConfig::load(&self.db).await?;
                Ok(Arc::new(FallbackChain::from_settings(&cfg.providers)?))
            }
        }
    }

    pub fn linker(&self) -> Interlinker {
        Interlinker::new(self.db.clone(), self.config.base_url.clone())
    }
}
