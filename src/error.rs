//! Error types for Colloquy
//!
//! This module defines the closed error taxonomy surfaced by the chat
//! client, using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Default retry-after hint for rate-limited requests (seconds)
pub const RATE_LIMIT_RETRY_AFTER: u64 = 60;

/// Default retry-after hint when the remote model is warming up (seconds)
pub const MODEL_LOADING_RETRY_AFTER: u64 = 20;

/// Chat request error
///
/// Every failure of an outbound generation request is classified into
/// exactly one of these variants. The calling layer renders the message
/// and, where present, the retry-after hint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// No response received (connectivity failure)
    #[error("{message}")]
    Network { message: String },

    /// Request aborted by the client-side timeout or cancellation
    #[error("{message}")]
    Timeout { message: String },

    /// Remote rejected the credential (HTTP 401)
    #[error("{message}")]
    ApiKey { message: String },

    /// Remote signalled quota exhaustion (HTTP 429)
    #[error("{message} (retry after {retry_after}s)")]
    RateLimit { message: String, retry_after: u64 },

    /// Backing model is warming up (HTTP 503)
    #[error("{message} (retry after {retry_after}s)")]
    ModelLoading { message: String, retry_after: u64 },

    /// Well-formed response with no generated text
    #[error("{message}")]
    EmptyResponse { message: String },

    /// Any other non-2xx status or unexpected payload shape
    #[error("{message}")]
    Unknown { message: String },
}

impl AppError {
    pub fn network() -> Self {
        Self::Network {
            message: "Network error. Please check your connection.".to_string(),
        }
    }

    pub fn timeout() -> Self {
        Self::Timeout {
            message: "Request timed out. Please try again.".to_string(),
        }
    }

    pub fn api_key() -> Self {
        Self::ApiKey {
            message: "Invalid API key. Please check your settings.".to_string(),
        }
    }

    pub fn rate_limit() -> Self {
        Self::RateLimit {
            message: "Rate limit exceeded. Please wait before trying again.".to_string(),
            retry_after: RATE_LIMIT_RETRY_AFTER,
        }
    }

    /// Model-loading error with the remote-supplied estimate, falling
    /// back to [`MODEL_LOADING_RETRY_AFTER`] when the remote gave none.
    pub fn model_loading(estimated_time: Option<u64>) -> Self {
        Self::ModelLoading {
            message: "Model is loading. Please wait a moment and try again.".to_string(),
            retry_after: estimated_time.unwrap_or(MODEL_LOADING_RETRY_AFTER),
        }
    }

    pub fn empty_response() -> Self {
        Self::EmptyResponse {
            message: "No response received from the AI model.".to_string(),
        }
    }

    /// Unknown error, keeping the remote-supplied detail when present
    pub fn unknown(detail: Option<String>) -> Self {
        Self::Unknown {
            message: detail.unwrap_or_else(|| "An unexpected error occurred.".to_string()),
        }
    }

    /// Stable snake_case tag for this variant, used in logs and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::ApiKey { .. } => "api_key",
            Self::RateLimit { .. } => "rate_limit",
            Self::ModelLoading { .. } => "model_loading",
            Self::EmptyResponse { .. } => "empty_response",
            Self::Unknown { .. } => "unknown",
        }
    }

    /// Seconds the caller should wait before retrying, if the remote said so
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after, .. } | Self::ModelLoading { retry_after, .. } => {
                Some(*retry_after)
            }
            _ => None,
        }
    }
}

/// Result type alias for Colloquy operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_display() {
        let error = AppError::network();
        assert_eq!(
            error.to_string(),
            "Network error. Please check your connection."
        );
    }

    #[test]
    fn test_timeout_error_display() {
        let error = AppError::timeout();
        assert_eq!(error.to_string(), "Request timed out. Please try again.");
    }

    #[test]
    fn test_api_key_error_display() {
        let error = AppError::api_key();
        assert_eq!(
            error.to_string(),
            "Invalid API key. Please check your settings."
        );
    }

    #[test]
    fn test_rate_limit_error_carries_default_retry() {
        let error = AppError::rate_limit();
        assert_eq!(error.kind(), "rate_limit");
        assert_eq!(error.retry_after(), Some(60));
        assert!(error.to_string().contains("retry after 60s"));
    }

    #[test]
    fn test_model_loading_prefers_remote_estimate() {
        let error = AppError::model_loading(Some(15));
        assert_eq!(error.retry_after(), Some(15));

        let fallback = AppError::model_loading(None);
        assert_eq!(fallback.retry_after(), Some(20));
    }

    #[test]
    fn test_unknown_error_keeps_remote_detail() {
        let error = AppError::unknown(Some("model not found".to_string()));
        assert_eq!(error.to_string(), "model not found");

        let generic = AppError::unknown(None);
        assert_eq!(generic.to_string(), "An unexpected error occurred.");
    }

    #[test]
    fn test_kind_tags_are_stable() {
        assert_eq!(AppError::network().kind(), "network");
        assert_eq!(AppError::timeout().kind(), "timeout");
        assert_eq!(AppError::api_key().kind(), "api_key");
        assert_eq!(AppError::empty_response().kind(), "empty_response");
        assert_eq!(AppError::unknown(None).kind(), "unknown");
    }

    #[test]
    fn test_retry_after_absent_for_non_retryable_kinds() {
        assert_eq!(AppError::network().retry_after(), None);
        assert_eq!(AppError::empty_response().retry_after(), None);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppError>();
    }
}
