//! SEO worker loop: synthesize pending posts, link pending posts, sleep.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use vitrine_core::defaults::{SITE_BASE_URL, WORKER_LINK_BATCH};
use vitrine_core::{GenerationBackend, PostRepository, Result};
use vitrine_db::Database;
use vitrine_inference::FallbackChain;
use vitrine_seo::{Interlinker, SeoSynthesizer, SynthesisOutcome};

use crate::config::CycleConfig;

/// Static configuration of the worker process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Whether the loop runs at all.
    pub enabled: bool,
    /// Base URL used for inserted anchors.
    pub base_url: String,
    /// Posts run through the link pass per cycle.
    pub link_batch: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: SITE_BASE_URL.to_string(),
            link_batch: WORKER_LINK_BATCH,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `WORKER_ENABLED` | `true` | Enable/disable the loop |
    /// | `SITE_BASE_URL` | `https://caasexpresss.com` | Anchor base URL |
    pub fn from_env() -> Self {
        let enabled = std::env::var("WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        let base_url = std::env::var("SITE_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| SITE_BASE_URL.to_string());

        Self {
            enabled,
            base_url,
            ..Default::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_link_batch(mut self, n: i64) -> Self {
        self.link_batch = n;
        self
    }
}

/// Where the generation backend comes from.
#[derive(Clone)]
pub enum BackendSource {
    /// Rebuild the provider chain from settings at every cycle.
    Settings,
    /// Always use this backend.
    Fixed(Arc<dyn GenerationBackend>),
}

/// Outcome counters of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub synthesized: usize,
    pub skipped: usize,
    pub failed: usize,
    pub linked: usize,
    pub links_created: usize,
    pub link_failures: usize,
}

/// Event emitted by the SEO worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    WorkerStarted,
    CycleStarted { cycle: u64 },
    PostSynthesized { post_id: i64 },
    PostSkipped { post_id: i64 },
    SynthesisFailed { post_id: i64, error: String },
    PostLinked { post_id: i64, links: usize },
    LinkFailed { post_id: i64, error: String },
    CycleCompleted { cycle: u64, report: CycleReport },
    WorkerStopped,
}

/// Handle for controlling a running worker.
pub struct WorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
    event_rx: broadcast::Receiver<WorkerEvent>,
}

impl WorkerHandle {
    /// Signal the worker to stop after the current cycle.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| vitrine_core::Error::Internal("Failed to send shutdown signal".into()))?;
        Ok(())
    }

    /// Get a receiver for worker events.
    pub fn events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.event_rx.resubscribe()
    }
}

/// Runs the synthesis and link passes in a loop.
pub struct SeoWorker {
    db: Database,
    config: WorkerConfig,
    backend: BackendSource,
    event_tx: broadcast::Sender<WorkerEvent>,
}

impl SeoWorker {
    pub fn new(db: Database, config: WorkerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(vitrine_core::defaults::EVENT_BUS_CAPACITY);
        Self {
            db,
            config,
            backend: BackendSource::Settings,
            event_tx,
        }
    }

    /// Use a fixed backend instead of the settings-driven provider chain.
    pub fn with_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backend = BackendSource::Fixed(backend);
        self
    }

    /// Get a receiver for worker events.
    pub fn events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.event_tx.subscribe()
    }

    fn backend_for(&self, cfg: &CycleConfig) -> Result<Arc<dyn GenerationBackend>> {
        match &self.backend {
            BackendSource::Fixed(backend) => Ok(backend.clone()),
            BackendSource::Settings => Ok(Arc::new(FallbackChain::from_settings(&cfg.providers)?)),
        }
    }

    fn emit(&self, event: WorkerEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Run one cycle with configuration read from the settings store.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let cfg = CycleConfig::load(&self.db).await?;
        self.run_cycle_with(&cfg).await
    }

    /// Run one cycle: synthesis batch, then link batch.
    ///
    /// Per-post failures are logged and counted; only a failure to list the
    /// pending posts aborts the cycle.
    #[instrument(skip(self, cfg), fields(subsystem = "jobs", component = "worker", op = "cycle"))]
    pub async fn run_cycle_with(&self, cfg: &CycleConfig) -> Result<CycleReport> {
        let start = Instant::now();
        let mut report = CycleReport::default();

        let backend = self.backend_for(cfg)?;
        let synthesizer = SeoSynthesizer::new(self.db.clone(), backend).with_mode(cfg.mode);

        let pending = self
            .db
            .posts
            .list_pending_seo(cfg.batch_size, cfg.max_attempts)
            .await?;
        debug!(pending = pending.len(), batch_size = cfg.batch_size, "SEO batch loaded");

        for post in &pending {
            match synthesizer.synthesize(post).await {
                Ok(SynthesisOutcome::Generated(_)) => {
                    report.synthesized += 1;
                    self.emit(WorkerEvent::PostSynthesized { post_id: post.id });
                }
                Ok(SynthesisOutcome::Skipped) => {
                    report.skipped += 1;
                    self.emit(WorkerEvent::PostSkipped { post_id: post.id });
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(post_id = post.id, error = %e, "SEO synthesis abandoned for this cycle");
                    self.emit(WorkerEvent::SynthesisFailed {
                        post_id: post.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        let linker = Interlinker::new(self.db.clone(), self.config.base_url.clone());
        let to_link = self.db.posts.list_pending_links(self.config.link_batch).await?;

        for post in &to_link {
            match linker.link_post(post).await {
                Ok(links) => {
                    report.linked += 1;
                    report.links_created += links.total();
                    self.emit(WorkerEvent::PostLinked {
                        post_id: post.id,
                        links: links.total(),
                    });
                }
                Err(e) => {
                    report.link_failures += 1;
                    error!(post_id = post.id, error = %e, "Link pass failed");
                    self.emit(WorkerEvent::LinkFailed {
                        post_id: post.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            synthesized = report.synthesized,
            skipped = report.skipped,
            failed = report.failed,
            linked = report.linked,
            links_created = report.links_created,
            duration_ms = start.elapsed().as_millis() as u64,
            "Cycle finished"
        );
        Ok(report)
    }

    /// Start the loop on a background task and return a handle for control.
    pub fn start(self) -> WorkerHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let event_rx = self.event_tx.subscribe();

        tokio::spawn(async move {
            self.run(&mut shutdown_rx).await;
        });

        WorkerHandle {
            shutdown_tx,
            event_rx,
        }
    }

    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!(subsystem = "jobs", component = "worker", "SEO worker is disabled, not starting");
            return;
        }

        info!(
            subsystem = "jobs",
            component = "worker",
            base_url = %self.config.base_url,
            "SEO worker started"
        );
        self.emit(WorkerEvent::WorkerStarted);

        let mut cycle: u64 = 0;
        loop {
            if shutdown_rx.try_recv().is_ok() {
                info!(subsystem = "jobs", component = "worker", "SEO worker received shutdown signal");
                break;
            }

            cycle += 1;
            self.emit(WorkerEvent::CycleStarted { cycle });

            let cfg = CycleConfig::load_or_default(&self.db).await;
            match self.run_cycle_with(&cfg).await {
                Ok(report) => self.emit(WorkerEvent::CycleCompleted { cycle, report }),
                Err(e) => error!(
                    subsystem = "jobs",
                    component = "worker",
                    cycle,
                    error = %e,
                    "Cycle aborted"
                ),
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!(subsystem = "jobs", component = "worker", "SEO worker received shutdown signal");
                    break;
                }
                _ = sleep(cfg.delay()) => {}
            }
        }

        self.emit(WorkerEvent::WorkerStopped);
        info!(subsystem = "jobs", component = "worker", "SEO worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_config_default() {
        let config = WorkerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.link_batch, 2);
        assert_eq!(config.base_url, SITE_BASE_URL);
    }

    #[test]
    fn test_worker_config_builder() {
        let config = WorkerConfig::default()
            .with_enabled(false)
            .with_base_url("http://localhost:3001")
            .with_link_batch(1);
        assert!(!config.enabled);
        assert_eq!(config.base_url, "http://localhost:3001");
        assert_eq!(config.link_batch, 1);
    }

    #[test]
    fn test_cycle_report_serializes_counters() {
        let report = CycleReport {
            synthesized: 2,
            ..Default::default()
        };
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["synthesized"], 2);
        assert_eq!(json["link_failures"], 0);
    }
}
