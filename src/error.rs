//! Error types for the bowling arena
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Callers that need to branch on a specific failure
//! recover it with `downcast_ref::<ArenaError>()`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific arena scenarios
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Competitor not found: {competitor_id}")]
    CompetitorNotFound { competitor_id: String },

    #[error("Competitor already queued: {competitor_id}")]
    QueueConflict { competitor_id: String },

    #[error("Game is not complete: {reason}")]
    IncompleteMatchState { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl ArenaError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        ArenaError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ArenaError::InternalError {
            message: message.into(),
        }
    }
}

/// Returns the arena error carried by an `anyhow::Error`, if any
pub fn arena_error(err: &anyhow::Error) -> Option<&ArenaError> {
    err.downcast_ref::<ArenaError>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_roundtrip() {
        let err: anyhow::Error = ArenaError::QueueConflict {
            competitor_id: "bot-1".to_string(),
        }
        .into();

        assert!(matches!(
            arena_error(&err),
            Some(ArenaError::QueueConflict { competitor_id }) if competitor_id == "bot-1"
        ));
        assert_eq!(err.to_string(), "Competitor already queued: bot-1");
    }

    #[test]
    fn test_plain_anyhow_is_not_arena_error() {
        let err = anyhow::anyhow!("something else");
        assert!(arena_error(&err).is_none());
    }
}
