//! Error types for the Coursebot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; `ChatError` is the
//! taxonomy every chat request is reduced to at the request boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by the completion service.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Failures while reading a single course document.
///
/// These never abort a request: the assembler logs and skips the document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("{path} is not valid UTF-8")]
    Decode { path: PathBuf },
}

/// Request-level error kinds surfaced to chat clients.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// The client sent something unusable (e.g. an empty message).
    #[error("{0}")]
    InvalidRequest(String),

    /// The server lacks required configuration (e.g. no API key).
    #[error("{0}")]
    Misconfigured(String),

    /// The completion service reported a failure.
    #[error("API error: {0}")]
    Upstream(String),

    /// Anything else. The detail is for server logs only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ChatError::InvalidRequest(_))
    }
}

impl From<ProviderError> for ChatError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ApiError { message, .. } => ChatError::Upstream(message),
            ProviderError::NotConfigured(reason) => ChatError::Misconfigured(reason),
            other => ChatError::Upstream(other.to_string()),
        }
    }
}

/// Result type alias for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 529,
            message: "Overloaded".into(),
        };
        assert!(err.to_string().contains("529"));
        assert!(err.to_string().contains("Overloaded"));
    }

    #[test]
    fn api_error_becomes_upstream_with_message() {
        let err: ChatError = ProviderError::ApiError {
            status_code: 400,
            message: "prompt is too long".into(),
        }
        .into();
        assert!(matches!(err, ChatError::Upstream(ref m) if m == "prompt is too long"));
        assert_eq!(err.to_string(), "API error: prompt is too long");
    }

    #[test]
    fn network_error_becomes_upstream() {
        let err: ChatError = ProviderError::Network("connection refused".into()).into();
        assert!(matches!(err, ChatError::Upstream(ref m) if m.contains("connection refused")));
        assert!(!err.is_client_error());
    }

    #[test]
    fn only_invalid_request_is_client_error() {
        assert!(ChatError::InvalidRequest("No message provided".into()).is_client_error());
        assert!(!ChatError::Misconfigured("no key".into()).is_client_error());
        assert!(!ChatError::Internal("boom".into()).is_client_error());
    }
}
