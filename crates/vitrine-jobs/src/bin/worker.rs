//! vitrine-worker: standalone SEO automation loop.
//!
//! Usage:
//!   vitrine-worker                 run until interrupted
//!   vitrine-worker --once          run a single cycle and print its report

use clap::Parser;
use tracing::info;

use vitrine_core::defaults::DATABASE_URL;
use vitrine_db::{Database, PoolConfig};
use vitrine_jobs::{init_tracing, SeoWorker, WorkerConfig, WorkerEvent};

#[derive(Parser)]
#[command(name = "vitrine-worker")]
#[command(author, version, about = "SEO metadata and internal-link worker for vitrine")]
struct Cli {
    /// Run one cycle and exit
    #[arg(long)]
    once: bool,

    /// Database URL (default: $DATABASE_URL or sqlite://vitrine.db?mode=rwc)
    #[arg(long)]
    database_url: Option<String>,

    /// Base URL for inserted anchors (default: $SITE_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_tracing("vitrine_jobs=info,vitrine_seo=info", "vitrine-worker.log");

    let database_url = cli
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DATABASE_URL.to_string());
    let db = Database::connect_with_config(&database_url, PoolConfig::from_env()).await?;
    db.migrate().await?;

    let mut config = WorkerConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    let worker = SeoWorker::new(db, config);

    if cli.once {
        let report = worker.run_cycle().await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let handle = worker.start();
    let mut events = handle.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let WorkerEvent::CycleCompleted { cycle, report } = event {
                info!(cycle, links = report.links_created, "Cycle completed");
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, stopping worker");
    handle.shutdown().await?;
    Ok(())
}
