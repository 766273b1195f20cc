//! Error types for the advisory collaborator
//!
//! Every variant is non-fatal to the primary result path: callers surface
//! [`AdvisoryError::fallback_message`] next to a retry affordance and keep
//! showing the scored result.

/// Shown to users whenever narrative content is unavailable
pub const FALLBACK_MESSAGE: &str = "AI insights are temporarily unavailable. Please try again later.";

/// Advisory call failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdvisoryError {
    /// No API key configured; no request was sent
    #[error("generative language API key not configured")]
    MissingCredential,

    /// Request never produced an HTTP response
    #[error("advisory request failed: {0}")]
    Transport(String),

    /// Request exceeded the client timeout
    #[error("advisory request timed out")]
    Timeout,

    /// Upstream answered with a non-success status
    #[error("advisory service returned {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Upstream answered but the payload was unusable
    #[error("malformed advisory response: {0}")]
    MalformedResponse(String),
}

impl AdvisoryError {
    /// User-safe text to display instead of narrative content
    #[inline]
    #[must_use]
    pub fn fallback_message(&self) -> &'static str {
        FALLBACK_MESSAGE
    }

    /// Check if re-invoking the call may succeed without configuration changes
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::MalformedResponse(_) => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::MissingCredential => false,
        }
    }
}

impl From<reqwest::Error> for AdvisoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(AdvisoryError::Timeout.is_retryable());
        assert!(AdvisoryError::Transport("reset".into()).is_retryable());
        assert!(AdvisoryError::Upstream { status: 503, body: String::new() }.is_retryable());
        assert!(AdvisoryError::Upstream { status: 429, body: String::new() }.is_retryable());
        assert!(!AdvisoryError::Upstream { status: 400, body: String::new() }.is_retryable());
        assert!(!AdvisoryError::MissingCredential.is_retryable());
    }

    #[test]
    fn fallback_is_user_safe() {
        let err = AdvisoryError::Upstream {
            status: 500,
            body: "stack trace".into(),
        };
        assert!(!err.fallback_message().contains("stack"));
    }
}
