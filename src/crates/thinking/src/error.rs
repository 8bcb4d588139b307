//! Error types for thinking providers and the thinking engine.

use thiserror::Error;

/// Result type for thinking operations.
pub type Result<T> = std::result::Result<T, ThinkingError>;

/// Errors surfaced by a `ThinkingProvider` or the `ThinkingEngine` wrapping it.
///
/// Variants mirror the provider-fault taxonomy: the engine never retries
/// these itself, it only classifies them so a caller can decide.
#[derive(Debug, Error)]
pub enum ThinkingError {
    /// Request failed validation before any provider call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Provider reported a rate limit.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Provider rejected credentials.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Provider call exceeded its timeout.
    #[error("request timed out: {0}")]
    TimedOut(String),

    /// Provider reported it is overloaded.
    #[error("provider overloaded: {0}")]
    Overloaded(String),

    /// Some other transient provider fault.
    #[error("transient provider error: {0}")]
    TransientOther(String),

    /// A non-retryable provider fault.
    #[error("permanent provider error: {0}")]
    PermanentOther(String),

    /// The provider did not invoke a tool the caller required.
    #[error("tool missing: {0}")]
    ToolMissing(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for provider-reported text that doesn't fit another variant.
    #[error("{0}")]
    Other(String),
}

impl ThinkingError {
    /// Whether retrying the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ThinkingError::RateLimited(_)
                | ThinkingError::TimedOut(_)
                | ThinkingError::Overloaded(_)
                | ThinkingError::TransientOther(_)
        )
    }

    /// Whether the failure is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ThinkingError::AuthFailed(_))
    }
}
