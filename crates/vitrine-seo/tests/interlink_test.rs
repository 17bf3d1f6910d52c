//! Link applier tests against an in-memory store.

use vitrine_core::keys::meta;
use vitrine_core::{PostRepository, PostStatus, UpdatePostRequest};
use vitrine_db::test_fixtures::TestDatabase;
use vitrine_seo::{Interlinker, LinkSuggestion, PreviewMode};

const BASE: &str = "https://caasexpresss.com";

#[tokio::test]
async fn test_pillar_keyword_links_second_post() {
    let test_db = TestDatabase::new().await;
    let pillar_id = test_db
        .published_post("Entrega Expressa em Guarulhos", "<p>Atendemos toda a cidade.</p>")
        .await;
    test_db.pillar(pillar_id, "entrega expressa").await;
    let source_id = test_db
        .published_post("Frete em São Paulo", "<p>nossa entrega expressa chega rápido</p>")
        .await;

    let linker = Interlinker::new(test_db.db.clone(), BASE);
    let source = test_db.db.posts.fetch(source_id).await.unwrap();
    let report = linker.link_post(&source).await.unwrap();

    assert_eq!(report.outbound.len(), 1);
    assert_eq!(report.outbound[0].target_id, pillar_id);
    assert_eq!(
        test_db.content_of(source_id).await,
        "<p>nossa <a href=\"https://caasexpresss.com/entrega-expressa-em-guarulhos\" \
         title=\"Entrega Expressa em Guarulhos\">entrega expressa</a> chega rápido</p>"
    );
    assert!(test_db.meta_of(source_id, meta::LINKED).await.is_some());
}

#[tokio::test]
async fn test_relinking_adds_nothing() {
    let test_db = TestDatabase::new().await;
    let pillar_id = test_db
        .published_post("Entrega Expressa em Guarulhos", "<p>Atendemos toda a cidade.</p>")
        .await;
    test_db.pillar(pillar_id, "entrega expressa").await;
    let source_id = test_db
        .published_post("Frete em São Paulo", "<p>a entrega expressa e outra entrega expressa hoje</p>")
        .await;

    let linker = Interlinker::new(test_db.db.clone(), BASE);
    let source = test_db.db.posts.fetch(source_id).await.unwrap();
    linker.link_post(&source).await.unwrap();
    let once = test_db.content_of(source_id).await;
    assert_eq!(once.matches("<a href").count(), 1);

    let again = linker.link_post(&source).await.unwrap();
    assert_eq!(again.total(), 0);
    assert_eq!(test_db.content_of(source_id).await, once);
}

#[tokio::test]
async fn test_inbound_pass_links_mentions_of_title() {
    let test_db = TestDatabase::new().await;
    let target_id = test_db.published_post("Motoboy Express", "<p>Serviço rápido.</p>").await;
    let mut sources = Vec::new();
    for i in 0..4 {
        sources.push(
            test_db
                .published_post(
                    &format!("Post {}", i),
                    "<p>Contrate um motoboy express hoje.</p>",
                )
                .await,
        );
    }
    let draft = test_db
        .draft_post("Rascunho", "<p>motoboy express no rascunho</p>")
        .await;

    let linker = Interlinker::new(test_db.db.clone(), BASE);
    let target = test_db.db.posts.fetch(target_id).await.unwrap();
    let links = linker.inbound_pass(&target).await.unwrap();

    assert_eq!(links.len(), 3);
    let mut linked = 0;
    for id in &sources {
        if test_db.content_of(*id).await.contains("/motoboy-express\"") {
            linked += 1;
        }
    }
    assert_eq!(linked, 3);
    assert!(!test_db.content_of(draft).await.contains("<a "));
}

#[tokio::test]
async fn test_non_pillar_target_respects_backlink_cap() {
    let test_db = TestDatabase::new().await;
    let target_id = test_db.published_post("Frete Barato", "<p>alvo</p>").await;
    test_db
        .meta(target_id, meta::SECONDARY_KEYWORDS, "frete barato")
        .await;
    for i in 0..5 {
        test_db
            .published_post(
                &format!("Já linkado {}", i),
                "<p><a href=\"https://caasexpresss.com/frete-barato\">x</a></p>",
            )
            .await;
    }
    let source_id = test_db
        .published_post("Outro", "<p>procure frete barato aqui</p>")
        .await;

    let linker = Interlinker::new(test_db.db.clone(), BASE);
    let source = test_db.db.posts.fetch(source_id).await.unwrap();
    let links = linker.outbound_pass(&source).await.unwrap();

    assert!(links.is_empty());
    assert_eq!(test_db.content_of(source_id).await, "<p>procure frete barato aqui</p>");
}

async fn seed_linking_posts(test_db: &TestDatabase, href: &str, count: usize) {
    for i in 0..count {
        test_db
            .published_post(
                &format!("Já linkado {}", i),
                &format!("<p><a href=\"{}\">x</a></p>", href),
            )
            .await;
    }
}

async fn seed_mentions(test_db: &TestDatabase, phrase: &str, count: usize) -> Vec<i64> {
    let mut ids = Vec::new();
    for i in 0..count {
        ids.push(
            test_db
                .published_post(&format!("Menção {}", i), &format!("<p>procure {} aqui</p>", phrase))
                .await,
        );
    }
    ids
}

#[tokio::test]
async fn test_inbound_pass_stops_at_backlink_cap() {
    let test_db = TestDatabase::new().await;
    let target_id = test_db.published_post("Frete Barato", "<p>alvo</p>").await;
    test_db
        .meta(target_id, meta::SECONDARY_KEYWORDS, "frete barato")
        .await;
    seed_linking_posts(&test_db, "https://caasexpresss.com/frete-barato", 5).await;
    let mentions = seed_mentions(&test_db, "frete barato", 3).await;

    let linker = Interlinker::new(test_db.db.clone(), BASE);
    let target = test_db.db.posts.fetch(target_id).await.unwrap();
    let report = linker.link_post(&target).await.unwrap();

    assert!(report.inbound.is_empty());
    assert_eq!(test_db.db.posts.count_containing("frete-barato").await.unwrap(), 5);
    for id in mentions {
        assert_eq!(test_db.content_of(id).await, "<p>procure frete barato aqui</p>");
    }
}

#[tokio::test]
async fn test_inbound_pass_fills_only_remaining_room() {
    let test_db = TestDatabase::new().await;
    let target_id = test_db.published_post("Frete Barato", "<p>alvo</p>").await;
    seed_linking_posts(&test_db, "https://caasexpresss.com/frete-barato", 4).await;
    seed_mentions(&test_db, "frete barato", 3).await;

    let linker = Interlinker::new(test_db.db.clone(), BASE);
    let target = test_db.db.posts.fetch(target_id).await.unwrap();
    let links = linker.inbound_pass(&target).await.unwrap();

    assert_eq!(links.len(), 1);
    assert_eq!(test_db.db.posts.count_containing("frete-barato").await.unwrap(), 5);
}

#[tokio::test]
async fn test_inbound_pass_ignores_cap_for_pillar() {
    let test_db = TestDatabase::new().await;
    let target_id = test_db.published_post("Frete Barato", "<p>alvo</p>").await;
    test_db.pillar(target_id, "frete barato").await;
    seed_linking_posts(&test_db, "https://caasexpresss.com/frete-barato", 5).await;
    seed_mentions(&test_db, "frete barato", 3).await;

    let linker = Interlinker::new(test_db.db.clone(), BASE);
    let target = test_db.db.posts.fetch(target_id).await.unwrap();
    let links = linker.inbound_pass(&target).await.unwrap();

    assert_eq!(links.len(), 3);
    assert_eq!(test_db.db.posts.count_containing("frete-barato").await.unwrap(), 8);
}

#[tokio::test]
async fn test_preview_and_apply_suggestions() {
    let test_db = TestDatabase::new().await;
    let pillar_id = test_db.published_post("Motoboy Rápido SP", "<p>hub</p>").await;
    test_db.pillar(pillar_id, "motoboy rápido").await;
    let source_id = test_db
        .published_post("Entregas", "<p>Chame um motoboy rápido agora.</p>")
        .await;

    let linker = Interlinker::new(test_db.db.clone(), BASE);
    let suggestions = linker.preview(PreviewMode::Pillar).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].source_id, source_id);
    assert_eq!(suggestions[0].target_id, pillar_id);

    let report = linker.apply_suggestions(&suggestions).await.unwrap();
    assert_eq!(report.applied, 1);
    assert!(test_db.content_of(source_id).await.contains("/motoboy-rapido-sp\""));

    // The source now references the pillar slug.
    let report = linker.apply_suggestions(&suggestions).await.unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.skipped, 1);
}

#[tokio::test]
async fn test_apply_skips_trashed_target() {
    let test_db = TestDatabase::new().await;
    let target_id = test_db.published_post("Frete Grátis Hoje", "<p>alvo</p>").await;
    let source_id = test_db.published_post("Fonte", "<p>sobre frete hoje</p>").await;
    test_db
        .db
        .posts
        .update(
            target_id,
            UpdatePostRequest {
                status: Some(PostStatus::Trash),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let linker = Interlinker::new(test_db.db.clone(), BASE);
    let report = linker
        .apply_suggestions(&[LinkSuggestion {
            source_id,
            source_title: "Fonte".to_string(),
            target_id,
            target_title: "Frete Grátis Hoje".to_string(),
            target_slug: "frete-gratis-hoje".to_string(),
            keyword: "frete".to_string(),
            score: 100,
        }])
        .await
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(test_db.content_of(source_id).await, "<p>sobre frete hoje</p>");
}
