//! Integration tests for the SEO worker.
//!
//! Every test runs against a fresh in-memory database with a scripted
//! generation backend, so no provider is ever contacted.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;

use vitrine_core::keys::{config, meta};
use vitrine_core::SettingsRepository;
use vitrine_db::test_fixtures::TestDatabase;
use vitrine_inference::mock::MockGenerationBackend;
use vitrine_jobs::{CycleConfig, SeoWorker, WorkerConfig, WorkerEvent};

const BODY: &str = "<p>Entregas rápidas de motoboy em Guarulhos e região, todos os dias.</p>";

const REPLY: &str = r#"{"seo_title": "Motoboy em Guarulhos", "seo_description": "Entregas no mesmo dia.",
"focus_keyword": "motoboy guarulhos", "tags": "motoboy, entregas"}"#;

fn worker(test_db: &TestDatabase, backend: &MockGenerationBackend) -> SeoWorker {
    SeoWorker::new(test_db.db.clone(), WorkerConfig::default())
        .with_backend(Arc::new(backend.clone()))
}

#[tokio::test]
async fn test_cycle_processes_batch_and_leaves_processed_posts_alone() {
    let test_db = TestDatabase::new().await;
    test_db.db.settings.set(config::BATCH_SIZE, "2").await.unwrap();

    let processed = test_db.published_post("Já processado", BODY).await;
    test_db.meta(processed, meta::SEO_DESCRIPTION, "antiga").await;
    test_db.meta(processed, meta::SEO_DONE, "2020-01-01 00:00:00").await;
    let first = test_db.published_post("Primeiro", BODY).await;
    let second = test_db.published_post("Segundo", BODY).await;

    let backend = MockGenerationBackend::new().with_default_response(REPLY);
    let report = worker(&test_db, &backend).run_cycle().await.unwrap();

    assert_eq!(report.synthesized, 2);
    assert_eq!(backend.call_count(), 2);

    let today = Utc::now().format("%Y-%m-%d").to_string();
    for id in [first, second] {
        let marker = test_db.meta_of(id, meta::SEO_DONE).await.unwrap();
        assert!(marker.starts_with(&today), "marker {marker} is not from today");
        assert_eq!(
            test_db.meta_of(id, meta::SEO_TITLE).await.as_deref(),
            Some("Motoboy em Guarulhos")
        );
    }
    assert_eq!(
        test_db.meta_of(processed, meta::SEO_DONE).await.as_deref(),
        Some("2020-01-01 00:00:00")
    );
    assert_eq!(
        test_db.meta_of(processed, meta::SEO_DESCRIPTION).await.as_deref(),
        Some("antiga")
    );
}

#[tokio::test]
async fn test_failed_posts_do_not_abort_the_batch() {
    let test_db = TestDatabase::new().await;
    let a = test_db.published_post("A", BODY).await;
    let b = test_db.published_post("B", BODY).await;

    let backend = MockGenerationBackend::always_fail("all providers failed: x: HTTP 500");
    let report = worker(&test_db, &backend).run_cycle().await.unwrap();

    assert_eq!(report.failed, 2);
    assert_eq!(report.synthesized, 0);
    for id in [a, b] {
        assert_eq!(test_db.meta_of(id, meta::SEO_DONE).await, None);
        assert_eq!(test_db.meta_of(id, meta::SEO_ATTEMPTS).await.as_deref(), Some("1"));
    }
    // The link pass still runs.
    assert_eq!(report.linked, 2);
}

#[tokio::test]
async fn test_max_attempts_drops_post_from_pending_set() {
    let test_db = TestDatabase::new().await;
    test_db.db.settings.set(config::MAX_ATTEMPTS, "1").await.unwrap();
    test_db.published_post("A", BODY).await;

    let backend = MockGenerationBackend::always_fail("down");
    let w = worker(&test_db, &backend);
    w.run_cycle().await.unwrap();
    let report = w.run_cycle().await.unwrap();

    assert_eq!(backend.call_count(), 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_short_posts_are_skipped_without_generation() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Curto", "<p>ok</p>").await;

    let backend = MockGenerationBackend::new();
    let report = worker(&test_db, &backend).run_cycle().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(backend.call_count(), 0);
    assert_eq!(
        test_db.meta_of(id, meta::SEO_DESCRIPTION).await.as_deref(),
        Some("skipped")
    );
}

#[tokio::test]
async fn test_started_worker_emits_events_and_shuts_down() {
    let test_db = TestDatabase::new().await;
    test_db.published_post("A", BODY).await;

    let backend = MockGenerationBackend::new().with_default_response(REPLY);
    let w = worker(&test_db, &backend);
    let mut events = w.events();
    let handle = w.start();

    let completed = timeout(Duration::from_secs(10), async {
        loop {
            match events.recv().await {
                Ok(WorkerEvent::CycleCompleted { report, .. }) => return report,
                Ok(_) => continue,
                Err(e) => panic!("event stream closed: {e}"),
            }
        }
    })
    .await
    .expect("cycle did not complete");
    assert_eq!(completed.synthesized, 1);

    handle.shutdown().await.unwrap();
    let stopped = timeout(Duration::from_secs(10), async {
        loop {
            if let Ok(WorkerEvent::WorkerStopped) = events.recv().await {
                return;
            }
        }
    })
    .await;
    assert!(stopped.is_ok());
}

#[tokio::test]
async fn test_cycle_config_falls_back_to_defaults_when_store_fails() {
    let test_db = TestDatabase::new().await;
    test_db
        .db
        .settings
        .set(config::BATCH_SIZE, "2")
        .await
        .unwrap();
    assert_eq!(CycleConfig::load_or_default(&test_db.db).await.batch_size, 2);

    test_db.db.pool.close().await;
    assert!(CycleConfig::load(&test_db.db).await.is_err());

    let cfg = CycleConfig::load_or_default(&test_db.db).await;
    assert_eq!(cfg.batch_size, 5);
    assert_eq!(cfg.delay(), Duration::from_secs(60));
    assert_eq!(cfg.max_attempts, 0);
}
