//! # vitrine-jobs
//!
//! Background SEO automation for vitrine.
//!
//! Every cycle the worker reads its tunables from the settings store,
//! synthesizes metadata for a batch of pending posts, runs the link pass over
//! a small batch of unlinked posts, then sleeps. "Pending" is defined by the
//! absence of processing markers, so a restart resumes where it stopped.
//!
//! ## Example
//!
//! ```ignore
//! use vitrine_db::Database;
//! use vitrine_jobs::{SeoWorker, WorkerConfig};
//!
//! let db = Database::connect("sqlite://vitrine.db?mode=rwc").await?;
//! let handle = SeoWorker::new(db, WorkerConfig::from_env()).start();
//!
//! let mut events = handle.events();
//! while let Ok(event) = events.recv().await {
//!     println!("Event: {:?}", event);
//! }
//!
//! handle.shutdown().await?;
//! ```

pub mod config;
pub mod telemetry;
pub mod worker;

// Re-export core types
pub use vitrine_core::*;

pub use config::CycleConfig;
pub use telemetry::init_tracing;
pub use worker::{BackendSource, CycleReport, SeoWorker, WorkerConfig, WorkerEvent, WorkerHandle};
