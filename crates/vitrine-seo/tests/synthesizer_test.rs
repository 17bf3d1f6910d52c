//! SEO synthesizer tests with a scripted backend.

use std::sync::Arc;

use vitrine_core::keys::meta;
use vitrine_core::{Error, PostRepository};
use vitrine_db::test_fixtures::TestDatabase;
use vitrine_inference::mock::MockGenerationBackend;
use vitrine_seo::synthesizer::SEO_SYSTEM_PROMPT;
use vitrine_seo::{SeoSynthesizer, SynthesisMode, SynthesisOutcome};

const BODY: &str = "<p>A Caas Express faz entregas rápidas de motoboy em toda Guarulhos.</p>";

#[tokio::test]
async fn test_short_content_is_marked_skipped_without_generation() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Curto", "<p>oi</p>").await;
    let backend = MockGenerationBackend::new();
    let synth = SeoSynthesizer::new(test_db.db.clone(), Arc::new(backend.clone()));

    let post = test_db.db.posts.fetch(id).await.unwrap();
    let outcome = synth.synthesize(&post).await.unwrap();

    assert_eq!(outcome, SynthesisOutcome::Skipped);
    assert_eq!(backend.call_count(), 0);
    assert_eq!(
        test_db.meta_of(id, meta::SEO_DESCRIPTION).await.as_deref(),
        Some("skipped")
    );
    assert!(test_db.meta_of(id, meta::SEO_DONE).await.is_some());
}

#[tokio::test]
async fn test_combined_reply_is_stored() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Motoboy em Guarulhos", BODY).await;
    let backend = MockGenerationBackend::new().with_default_response(
        r#"{"seo_title": "Motoboy em Guarulhos | Caas", "seo_description": "Entregas rápidas.",
            "focus_keyword": "motoboy guarulhos", "tags": "motoboy, entregas",
            "secondary_keywords": "motoboy rápido"}"#,
    );
    let synth = SeoSynthesizer::new(test_db.db.clone(), Arc::new(backend.clone()));

    let post = test_db.db.posts.fetch(id).await.unwrap();
    let outcome = synth.synthesize(&post).await.unwrap();

    assert!(matches!(outcome, SynthesisOutcome::Generated(_)));
    assert_eq!(backend.call_count(), 1);
    assert_eq!(backend.calls()[0].system, SEO_SYSTEM_PROMPT);
    assert_eq!(
        test_db.meta_of(id, meta::SEO_TITLE).await.as_deref(),
        Some("Motoboy em Guarulhos | Caas")
    );
    assert_eq!(
        test_db.meta_of(id, meta::SECONDARY_KEYWORDS).await.as_deref(),
        Some("motoboy rápido")
    );
    assert_eq!(
        test_db.meta_of(id, meta::AI_TAGS).await.as_deref(),
        Some("motoboy, entregas")
    );
    assert!(test_db.meta_of(id, meta::SEO_DONE).await.is_some());
}

#[tokio::test]
async fn test_unparseable_combined_reply_falls_back_to_per_field() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Motoboy em Guarulhos", BODY).await;
    let backend = MockGenerationBackend::new()
        .with_response(Ok("Claro! Aqui vai um texto sem JSON.".to_string()))
        .with_response(Ok("\"Entregas rápidas em Guarulhos.\"\n".to_string()))
        .with_response(Ok("Motoboy Rápido".to_string()));
    let synth = SeoSynthesizer::new(test_db.db.clone(), Arc::new(backend.clone()));

    let post = test_db.db.posts.fetch(id).await.unwrap();
    synth.synthesize(&post).await.unwrap();

    assert_eq!(backend.call_count(), 3);
    assert_eq!(
        test_db.meta_of(id, meta::SEO_DESCRIPTION).await.as_deref(),
        Some("Entregas rápidas em Guarulhos.")
    );
    assert_eq!(
        test_db.meta_of(id, meta::SEO_TITLE).await.as_deref(),
        Some("Motoboy Rápido")
    );
}

#[tokio::test]
async fn test_per_field_mode_sends_two_requests() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Motoboy em Guarulhos", BODY).await;
    let backend = MockGenerationBackend::new()
        .with_response(Ok("Descrição.".to_string()))
        .with_response(Ok("Título".to_string()));
    let synth = SeoSynthesizer::new(test_db.db.clone(), Arc::new(backend.clone()))
        .with_mode(SynthesisMode::PerField);

    let post = test_db.db.posts.fetch(id).await.unwrap();
    synth.synthesize(&post).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].prompt.starts_with("Create a catchy"));
    assert_eq!(test_db.meta_of(id, meta::FOCUS_KEYWORD).await, None);
}

#[tokio::test]
async fn test_failure_writes_no_metadata_and_counts_attempts() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Motoboy em Guarulhos", BODY).await;
    let backend = MockGenerationBackend::always_fail("all providers failed: a: HTTP 500");
    let synth = SeoSynthesizer::new(test_db.db.clone(), Arc::new(backend));

    let post = test_db.db.posts.fetch(id).await.unwrap();
    let err = synth.synthesize(&post).await.unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
    synth.synthesize(&post).await.unwrap_err();

    assert_eq!(test_db.meta_of(id, meta::SEO_TITLE).await, None);
    assert_eq!(test_db.meta_of(id, meta::SEO_DESCRIPTION).await, None);
    assert_eq!(test_db.meta_of(id, meta::SEO_DONE).await, None);
    assert_eq!(test_db.meta_of(id, meta::SEO_ATTEMPTS).await.as_deref(), Some("2"));
}
