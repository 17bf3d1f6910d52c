//! Provider-level generation errors.

use thiserror::Error;

use vitrine_core::defaults::GENERATION_ERROR_BODY_LEN;
use vitrine_core::text::truncate_chars;
use vitrine_core::Error;

/// Why a single provider failed to produce text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Non-2xx response; body truncated to a short prefix.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// Response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Response decoded but held no text.
    #[error("empty reply")]
    Empty,
}

impl GenerationError {
    /// Build an HTTP error, keeping only the first characters of the body.
    pub fn http(status: u16, body: &str) -> Self {
        Self::Http {
            status,
            body: truncate_chars(body, GENERATION_ERROR_BODY_LEN).to_string(),
        }
    }

    /// Classify a reqwest send/read failure. The URL is dropped from the
    /// message since it can carry an API key.
    pub fn from_reqwest(e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            Self::Timeout(timeout_secs)
        } else {
            Self::Transport(e.without_url().to_string())
        }
    }

    /// Response body could not be decoded; URL dropped as above.
    pub fn decode(e: reqwest::Error) -> Self {
        Self::Decode(e.without_url().to_string())
    }
}

impl From<GenerationError> for Error {
    fn from(e: GenerationError) -> Self {
        Error::Inference(e.to_string())
    }
}

/// Provider-facing message of an error, without the `Inference error:` prefix.
pub fn reason(e: &Error) -> String {
    match e {
        Error::Inference(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_truncates_body() {
        let body = "x".repeat(500);
        let err = GenerationError::http(503, &body);
        let text = err.to_string();
        assert!(text.starts_with("HTTP 503: "));
        assert_eq!(text.len(), "HTTP 503: ".len() + GENERATION_ERROR_BODY_LEN);
    }

    #[test]
    fn test_http_error_short_body_kept() {
        let err = GenerationError::http(401, "unauthorized");
        assert_eq!(err.to_string(), "HTTP 401: unauthorized");
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(GenerationError::Timeout(30).to_string(), "timed out after 30s");
    }

    #[test]
    fn test_into_core_error() {
        let err: Error = GenerationError::Empty.into();
        assert!(matches!(err, Error::Inference(ref m) if m == "empty reply"));
    }

    #[test]
    fn test_reason_strips_prefix() {
        assert_eq!(reason(&Error::Inference("boom".to_string())), "boom");
        assert_eq!(
            reason(&Error::Config("x".to_string())),
            "Configuration error: x"
        );
    }
}
