//! vitrine-api: WordPress-compatible REST server with the SEO worker
//! running in-process.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use vitrine_api::config::BODY_LIMIT_BYTES;
use vitrine_api::{router, ApiConfig, AppState};
use vitrine_core::defaults::DATABASE_URL;
use vitrine_db::{Database, PoolConfig};
use vitrine_jobs::{init_tracing, SeoWorker, WorkerConfig, WorkerEvent};

#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([
            header::HeaderName::from_static("x-wp-total"),
            header::HeaderName::from_static("x-wp-totalpages"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing(
        "vitrine_api=info,vitrine_jobs=info,vitrine_seo=info,tower_http=info",
        "vitrine-api.log",
    );

    let config = ApiConfig::from_env();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DATABASE_URL.to_string());
    let db = Database::connect_with_config(&database_url, PoolConfig::from_env()).await?;
    db.migrate().await?;
    info!(subsystem = "api", database_url = %database_url, "Database ready");

    if config.credentials.password.is_empty() && config.credentials.bearer_token.is_empty() {
        warn!("No API_PASSWORD or API_BEARER_TOKEN configured, all writes will be rejected");
    }

    let worker = if config.worker_enabled {
        let worker_config = WorkerConfig::from_env().with_base_url(config.base_url.clone());
        let handle = SeoWorker::new(db.clone(), worker_config).start();
        let mut events = handle.events();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                if let WorkerEvent::CycleCompleted { cycle, report } = event {
                    info!(
                        subsystem = "jobs",
                        cycle,
                        synthesized = report.synthesized,
                        links = report.links_created,
                        "Worker cycle completed"
                    );
                }
            }
        });
        Some(handle)
    } else {
        info!("SEO worker disabled (WORKER_ENABLED=false)");
        None
    };

    let bind_addr = config.bind_addr();
    let cors = cors_layer(&config);
    let state = AppState::new(db, config);

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));

    info!("Starting server on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Interrupt received, shutting down");
        })
        .await?;

    if let Some(handle) = worker {
        handle.shutdown().await?;
    }
    Ok(())
}
