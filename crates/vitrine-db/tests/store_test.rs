use vitrine_db::keys::config;
use vitrine_db::test_fixtures::TestDatabase;
use vitrine_db::{
    CreateMediaRequest, CreateTermRequest, Error, MediaRepository, PillarRepository, PillarSave,
    PostMetaRepository, SettingsRepository, Taxonomy, TermRepository, UpdateMediaRequest,
};

// =============================================================================
// PILLARS
// =============================================================================

#[tokio::test]
async fn test_pillar_save_creates_then_updates() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Motoboy em SP", "x").await;

    let pillars = &test_db.db.pillars;
    assert_eq!(pillars.save(id, "motoboy").await.unwrap(), PillarSave::Created);
    assert_eq!(
        pillars.save(id, "motoboy, entrega").await.unwrap(),
        PillarSave::Updated
    );

    let pillar = pillars.get(id).await.unwrap().unwrap();
    assert_eq!(pillar.keywords, "motoboy, entrega");
    assert_eq!(pillar.slug, "motoboy-em-sp");
    assert_eq!(pillar.title, "Motoboy em SP");
    assert_eq!(pillars.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_pillar_limit_blocks_new_but_allows_update() {
    let test_db = TestDatabase::new().await;
    let mut ids = Vec::new();
    for i in 0..6 {
        ids.push(test_db.published_post(&format!("Pilar {}", i), "x").await);
    }
    for id in &ids[..5] {
        test_db.pillar(*id, "kw").await;
    }

    let pillars = &test_db.db.pillars;
    let err = pillars.save(ids[5], "kw").await.unwrap_err();
    assert!(matches!(err, Error::LimitReached(_)));

    assert_eq!(
        pillars.save(ids[0], "novo").await.unwrap(),
        PillarSave::Updated
    );
    assert_eq!(pillars.count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_pillar_for_missing_post() {
    let test_db = TestDatabase::new().await;
    let err = test_db.db.pillars.save(42, "kw").await.unwrap_err();
    assert!(matches!(err, Error::PostNotFound(42)));
}

#[tokio::test]
async fn test_pillar_remove() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Pilar", "x").await;
    test_db.pillar(id, "kw").await;

    assert!(test_db.db.pillars.remove(id).await.unwrap());
    assert!(!test_db.db.pillars.remove(id).await.unwrap());
    assert!(test_db.db.pillars.list().await.unwrap().is_empty());
}

// =============================================================================
// POST META
// =============================================================================

#[tokio::test]
async fn test_meta_upsert_replaces_value() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Post", "x").await;

    let meta = &test_db.db.meta;
    meta.set(id, "seo_title", "um").await.unwrap();
    meta.set(id, "seo_title", "dois").await.unwrap();

    assert_eq!(meta.get(id, "seo_title").await.unwrap().as_deref(), Some("dois"));
    assert_eq!(meta.get_all(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_meta_set_many_and_delete() {
    let test_db = TestDatabase::new().await;
    let id = test_db.published_post("Post", "x").await;

    let meta = &test_db.db.meta;
    meta.set_many(id, &[("a", "1"), ("b", "2")]).await.unwrap();
    let all = meta.get_all(id).await.unwrap();
    assert_eq!(all.get("a").map(String::as_str), Some("1"));
    assert_eq!(all.get("b").map(String::as_str), Some("2"));

    meta.delete(id, "a").await.unwrap();
    assert!(meta.get(id, "a").await.unwrap().is_none());
}

#[tokio::test]
async fn test_meta_list_by_key_skips_empty_values() {
    let test_db = TestDatabase::new().await;
    let a = test_db.published_post("A", "x").await;
    let b = test_db.published_post("B", "x").await;
    test_db.meta(a, "secondary_keywords", "frete, mudança").await;
    test_db.meta(b, "secondary_keywords", "").await;

    let rows = test_db.db.meta.list_by_key("secondary_keywords").await.unwrap();
    assert_eq!(rows, vec![(a, "frete, mudança".to_string())]);
}

// =============================================================================
// SETTINGS
// =============================================================================

#[tokio::test]
async fn test_settings_seeded_and_upserted() {
    let test_db = TestDatabase::new().await;
    let settings = &test_db.db.settings;

    assert_eq!(
        settings.get(config::TEXT_MODEL).await.unwrap().as_deref(),
        Some("openai")
    );

    settings.set(config::BATCH_SIZE, "2").await.unwrap();
    settings
        .set_many(&[
            (config::BATCH_SIZE.to_string(), "3".to_string()),
            (config::BATCH_DELAY.to_string(), "10".to_string()),
        ])
        .await
        .unwrap();

    let all = settings.all().await.unwrap();
    assert_eq!(all.get(config::BATCH_SIZE).map(String::as_str), Some("3"));
    assert_eq!(all.get(config::BATCH_DELAY).map(String::as_str), Some("10"));
    assert!(settings.get("missing").await.unwrap().is_none());
}

// =============================================================================
// TERMS
// =============================================================================

#[tokio::test]
async fn test_default_category_seeded() {
    let test_db = TestDatabase::new().await;
    let categories = test_db.db.terms.list(Taxonomy::Category).await.unwrap();
    assert!(categories.iter().any(|t| t.slug == "sem-categoria"));
    assert!(test_db.db.terms.list(Taxonomy::Tag).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_tag_and_count_posts() {
    let test_db = TestDatabase::new().await;
    let post = test_db.published_post("Post", "x").await;

    let terms = &test_db.db.terms;
    let tag = terms
        .create(
            Taxonomy::Tag,
            CreateTermRequest {
                name: "Entrega Rápida".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(tag.slug, "entrega-rapida");
    assert_eq!(tag.taxonomy, Taxonomy::Tag);
    assert_eq!(tag.count, 0);

    terms.set_for_post(post, Taxonomy::Tag, &[tag.id]).await.unwrap();
    assert_eq!(terms.fetch(tag.id).await.unwrap().count, 1);
    assert_eq!(terms.get_for_post(post, Taxonomy::Tag).await.unwrap(), vec![tag.id]);
    assert!(terms
        .get_for_post(post, Taxonomy::Category)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_create_duplicate_term_fails() {
    let test_db = TestDatabase::new().await;
    let err = test_db
        .db
        .terms
        .create(
            Taxonomy::Category,
            CreateTermRequest {
                name: "Dicas".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_set_for_post_ignores_other_taxonomy() {
    let test_db = TestDatabase::new().await;
    let post = test_db.published_post("Post", "x").await;
    let category = test_db.db.terms.list(Taxonomy::Category).await.unwrap()[0].id;

    test_db
        .db
        .terms
        .set_for_post(post, Taxonomy::Tag, &[category])
        .await
        .unwrap();
    assert!(test_db
        .db
        .terms
        .get_for_post(post, Taxonomy::Tag)
        .await
        .unwrap()
        .is_empty());
}

// =============================================================================
// MEDIA
// =============================================================================

#[tokio::test]
async fn test_media_insert_derives_file_title_and_mime() {
    let test_db = TestDatabase::new().await;
    let media = &test_db.db.media;

    let id = media
        .insert(CreateMediaRequest {
            source_url: "https://cdn.example.com/uploads/capa-motoboy.png".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let item = media.fetch(id).await.unwrap();
    assert_eq!(item.file, "capa-motoboy.png");
    assert_eq!(item.title, "capa-motoboy");
    assert_eq!(item.mime_type, "image/png");
    assert_eq!(media.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_media_requires_source_url() {
    let test_db = TestDatabase::new().await;
    let err = test_db
        .db
        .media
        .insert(CreateMediaRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_media_update_alt_text() {
    let test_db = TestDatabase::new().await;
    let media = &test_db.db.media;
    let id = media
        .insert(CreateMediaRequest {
            title: "Capa".to_string(),
            source_url: "https://cdn.example.com/capa.jpg".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let updated = media
        .update(
            id,
            UpdateMediaRequest {
                alt_text: Some("Motoboy entregando".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.alt_text, "Motoboy entregando");
    assert_eq!(updated.title, "Capa");

    assert!(matches!(
        media.fetch(999).await.unwrap_err(),
        Error::NotFound(_)
    ));
}
