//! HTTP-level tests for the generation providers and the fallback chain.
//!
//! Every provider is pointed at a local wiremock server.

use std::time::Duration;

use vitrine_core::GenerationBackend;
use vitrine_inference::gemini::{GeminiBackend, GeminiConfig};
use vitrine_inference::openai::{OpenAIBackend, OpenAIConfig};
use vitrine_inference::{FallbackChain, ProviderCapability, ProviderConfig, ProviderKind};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]
    })
}

fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    })
}

fn openai_provider(id: &str, base_url: String, key: Option<&str>, keyless: bool) -> ProviderConfig {
    let mut capabilities = vec![ProviderCapability::Generation];
    if keyless {
        capabilities.push(ProviderCapability::Keyless);
    }
    ProviderConfig {
        id: id.to_string(),
        kind: ProviderKind::OpenAICompatible,
        base_url,
        api_key: key.map(str::to_string),
        model: "openai".to_string(),
        capabilities,
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_chat_request_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "openai",
            "temperature": 0.7,
            "messages": [
                {"role": "system", "content": "Você é um Especialista em SEO."},
                {"role": "user", "content": "Resuma isto"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("  resumo  ")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAIBackend::new(OpenAIConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();

    let text = backend
        .generate_with_system("Você é um Especialista em SEO.", "Resuma isto")
        .await
        .unwrap();
    assert_eq!(text, "resumo");
}

#[tokio::test]
async fn test_bearer_header_sent_when_key_present() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAIBackend::new(OpenAIConfig {
        base_url: server.uri(),
        api_key: Some("sk-test".to_string()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(backend.generate("x").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_http_error_is_reported_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream busy"))
        .mount(&server)
        .await;

    let backend = OpenAIBackend::new(OpenAIConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();

    let err = backend.chat("", "x").await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 503: upstream busy");
}

#[tokio::test]
async fn test_gemini_request_uses_key_query_and_system_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "g-key"))
        .and(body_partial_json(serde_json::json!({
            "systemInstruction": {"parts": [{"text": "sys"}]},
            "contents": [{"role": "user", "parts": [{"text": "prompt"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("resposta")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = GeminiConfig::new("g-key");
    config.base_url = server.uri();
    let backend = GeminiBackend::new(config).unwrap();

    assert_eq!(
        backend.generate_with_system("sys", "prompt").await.unwrap(),
        "resposta"
    );
}

#[tokio::test]
async fn test_gemini_transport_error_hides_key() {
    let mut config = GeminiConfig::new("SUPERSECRETKEY123");
    config.base_url = "http://127.0.0.1:1".to_string();
    config.timeout_seconds = 2;
    let backend = GeminiBackend::new(config).unwrap();

    let err = backend.generate_with_system("sys", "prompt").await.unwrap_err();

    let text = err.to_string();
    assert!(!text.contains("SUPERSECRETKEY123"), "key leaked: {}", text);
    assert!(!text.contains("key="), "query leaked: {}", text);
}

#[tokio::test]
async fn test_gemini_decode_error_hides_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut config = GeminiConfig::new("SUPERSECRETKEY123");
    config.base_url = server.uri();
    let backend = GeminiBackend::new(config).unwrap();

    let err = backend.generate_with_system("sys", "prompt").await.unwrap_err();

    assert!(err.to_string().starts_with("Inference error: invalid response"));
    assert!(!err.to_string().contains("SUPERSECRETKEY123"));
}

#[tokio::test]
async fn test_chain_falls_back_after_server_error() {
    let primary = MockServer::start().await;
    let backup = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer backup-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("do backup")))
        .expect(1)
        .mount(&backup)
        .await;

    let chain = FallbackChain::from_configs(vec![
        openai_provider("pollinations-primary", primary.uri(), None, true),
        openai_provider("pollinations-backup", backup.uri(), Some("backup-key"), false),
    ])
    .unwrap();

    assert_eq!(chain.generate("x").await.unwrap(), "do backup");
}

#[tokio::test]
async fn test_chain_treats_empty_reply_as_failure() {
    let primary = MockServer::start().await;
    let backup = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("   ")))
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("texto")))
        .mount(&backup)
        .await;

    let chain = FallbackChain::from_configs(vec![
        openai_provider("a", primary.uri(), None, true),
        openai_provider("b", backup.uri(), None, true),
    ])
    .unwrap();

    assert_eq!(chain.generate("x").await.unwrap(), "texto");
}

#[tokio::test]
async fn test_chain_aggregates_failures_and_skips_keyless_gaps() {
    let primary = MockServer::start().await;
    let unused = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("nunca")))
        .expect(0)
        .mount(&unused)
        .await;

    let chain = FallbackChain::from_configs(vec![
        openai_provider("pollinations-primary", primary.uri(), None, true),
        openai_provider("openai", unused.uri(), None, false),
    ])
    .unwrap();
    assert_eq!(chain.provider_names(), vec!["pollinations-primary"]);

    let err = chain.generate("x").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Inference error: all providers failed: pollinations-primary: HTTP 429: rate limited"
    );
}
