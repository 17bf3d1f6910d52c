//! Server configuration read from the environment.

use vitrine_core::defaults::{SERVER_PORT, SITE_BASE_URL, SITE_NAME};

use crate::auth::Credentials;

/// Origins allowed by CORS when `ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8000,https://caasexpresss.com";

/// Maximum request body size (JSON only, no binary uploads).
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Public site URL used in links, guids and inserted anchors.
    pub base_url: String,
    pub site_name: String,
    pub credentials: Credentials,
    /// Run the SEO worker inside the server process.
    pub worker_enabled: bool,
    pub allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: SERVER_PORT,
            base_url: SITE_BASE_URL.to_string(),
            site_name: SITE_NAME.to_string(),
            credentials: Credentials::default(),
            worker_enabled: true,
            allowed_origins: parse_origins(DEFAULT_ALLOWED_ORIGINS),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

impl ApiConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `HOST` | `0.0.0.0` | Bind address |
    /// | `PORT` | `3001` | Listen port |
    /// | `SITE_BASE_URL` | `https://caasexpresss.com` | Public site URL |
    /// | `SITE_NAME` | `Caas Express Blog` | Name shown at `/wp-json` |
    /// | `API_USER` | (none) | Basic auth user |
    /// | `API_PASSWORD` | (none) | Basic auth password |
    /// | `API_BEARER_TOKEN` | (none) | Static bearer token |
    /// | `WORKER_ENABLED` | `true` | Run the SEO worker in-process |
    /// | `ALLOWED_ORIGINS` | localhost:8000 and the site | CORS allow-list |
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(SERVER_PORT);
        let worker_enabled = std::env::var("WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            host: env_or("HOST", "0.0.0.0"),
            port,
            base_url: env_or("SITE_BASE_URL", SITE_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            site_name: env_or("SITE_NAME", SITE_NAME),
            credentials: Credentials {
                user: std::env::var("API_USER").unwrap_or_default(),
                password: std::env::var("API_PASSWORD").unwrap_or_default(),
                bearer_token: std::env::var("API_BEARER_TOKEN").unwrap_or_default(),
            },
            worker_enabled,
            allowed_origins: parse_origins(&env_or("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
