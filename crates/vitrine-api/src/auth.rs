//! Static-credential authentication.
//!
//! Reads are public. Every other method needs either HTTP Basic with the
//! configured user and application password, or the configured bearer token.

use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Configured API credentials. Empty values disable that scheme.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub bearer_token: String,
}

/// Collapse runs of whitespace and trim; application passwords are often
/// pasted with their display spaces.
fn normalize_password(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Credentials {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        bearer_token: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            bearer_token: bearer_token.into(),
        }
    }

    /// Whether an `Authorization` header value matches these credentials.
    pub fn accepts(&self, header_value: &str) -> bool {
        if let Some(encoded) = header_value.strip_prefix("Basic ") {
            return self.accepts_basic(encoded.trim());
        }
        if let Some(token) = header_value.strip_prefix("Bearer ") {
            return !self.bearer_token.is_empty() && token.trim() == self.bearer_token;
        }
        false
    }

    fn accepts_basic(&self, encoded: &str) -> bool {
        let expected = normalize_password(&self.password);
        if self.user.is_empty() || expected.is_empty() {
            return false;
        }
        let Ok(decoded) = STANDARD.decode(encoded) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };
        match decoded.split_once(':') {
            Some((user, password)) => user == self.user && normalize_password(password) == expected,
            None => false,
        }
    }
}

/// Middleware rejecting unauthenticated writes with `rest_not_logged_in`.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(request).await);
    }

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| state.config.credentials.accepts(v));

    if !authorized {
        warn!(
            subsystem = "api",
            component = "auth",
            method = %request.method(),
            path = request.uri().path(),
            "Rejected unauthenticated request"
        );
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
