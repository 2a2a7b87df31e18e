use serde::Deserialize;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not authenticated - please log in")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Coarse error category used by front ends to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Network,
    Validation,
    Server,
    NotFound,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// FastAPI error body. `detail` is a string for handled errors and a list of
/// field errors for request validation failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let end = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Extract the user-facing `detail` message from an error body, if any.
    pub fn detail_message(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .next()
                .map(str::to_string),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::detail_message(body);
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(detail.unwrap_or(truncated)),
            429 => ApiError::RateLimited,
            400..=499 => ApiError::Validation(
                detail.unwrap_or_else(|| format!("Request rejected ({})", status)),
            ),
            500..=599 => ApiError::Server(detail.unwrap_or(truncated)),
            _ => ApiError::Server(format!("Status {}: {}", status, truncated)),
        }
    }

    /// A 2xx response whose body does not match the expected shape.
    pub fn invalid_response(what: &str, err: serde_json::Error) -> Self {
        ApiError::Server(format!("Unexpected {} payload: {}", what, err))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized => ErrorKind::Auth,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::RateLimited | ApiError::Server(_) => ErrorKind::Server,
        }
    }

    /// Whether a manual retry of the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Network | ErrorKind::Server
        )
    }
}
