// ABOUTME: Completion service trait abstracting the external text-completion API.
// ABOUTME: One call per invocation; stateless, potentially slow or unavailable.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a completion service call.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("response contained no completion content")]
    Empty,
}

/// A stateless text-completion service.
///
/// Implementations perform exactly one upstream call per invocation and
/// report the outcome; retry policy belongs to the caller.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send a system instruction plus user text, returning the raw
    /// completion text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
}
