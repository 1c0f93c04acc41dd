//! Provider error types.

use thiserror::Error;

/// Errors from a chat-completion backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP 429.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// HTTP 401/403.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// HTTP 404, usually a model id the backend does not serve.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The backend answered 200 but with no completion text.
    #[error("empty completion from model {0}")]
    EmptyCompletion(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    NetworkError(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
