use thiserror::Error;

/// The taxonomy from §7: every failure a caller can observe collapses into
/// one of these variants.
#[derive(Debug, Error)]
pub enum GdeltError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {message}")]
    Api { status: Option<u16>, message: String },

    #[error("API unavailable: {0}")]
    Unavailable(String),

    #[error("rate limited{}", retry_after_ms.map(|ms| format!(" (retry after {ms}ms)")).unwrap_or_default())]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("filter validation error: {0}")]
    Validation(String),

    #[error("security error: {0}")]
    Security(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GdeltError {
    /// Whether the orchestrator should retry this failure, per §4.7: decode
    /// and parse errors never retry, transient transport failures do.
    pub fn is_retryable(&self) -> bool {
        match self {
            GdeltError::RateLimited { .. } | GdeltError::Unavailable(_) | GdeltError::Api { .. } => true,
            GdeltError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Caller-chosen stance on per-record/per-URL failures (§4.5, §7, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Propagate immediately and cancel sibling work.
    Raise,
    /// Record a `FailedRequest`/warning and continue.
    #[default]
    Warn,
    /// Drop silently and continue.
    Skip,
}

/// Why a single URL's acquisition failed, and how many attempts were made
/// before giving up (§3.1 `FailedRequest`).
#[derive(Debug, Clone)]
pub struct FailedRequest {
    pub url: String,
    pub reason: FailureReason,
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub enum FailureReason {
    RateLimited,
    HttpError(u16),
    Timeout,
    DecodeError(String),
    ParseError(String),
}

impl FailureReason {
    /// The HTTP status this failure carries, if any — used when a caller
    /// re-raises a recorded failure and needs a status to attach to it.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FailureReason::HttpError(status) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_includes_line_and_message() {
        let err = GdeltError::Parse {
            line: 42,
            message: "bad field".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("42"));
        assert!(msg.contains("bad field"));
    }

    #[test]
    fn rate_limited_is_retryable() {
        let err = GdeltError::RateLimited {
            retry_after_ms: Some(60_000),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn validation_error_is_not_retryable() {
        let err = GdeltError::Validation("bad range".into());
        assert!(!err.is_retryable());
    }

    #[test]
    fn error_policy_default_is_warn() {
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Warn);
    }
}
