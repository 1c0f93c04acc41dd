//! Error types for the quiz engine.
//!
//! `QuizError` is what every engine operation returns. Adapters and stores have
//! their own narrower error types which the engine classifies into it, so callers
//! can tell a missing meeting from a bad payload without string matching.

use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// A referenced meeting, user, quiz, or attempt does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed generator payload, wrong submission shape, or missing
    /// transcripts/attempts where they are required.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation would duplicate a one-shot record.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The content generator failed or did not answer in time.
    #[error("content generator failed during {operation} for meeting {meeting_id}: {message}")]
    Upstream {
        operation: &'static str,
        meeting_id: i64,
        message: String,
    },

    /// The storage backend failed for a reason unrelated to the request.
    #[error("store error: {0}")]
    Store(String),
}

impl QuizError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        QuizError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Short machine-readable kind, logged by the CLI when a command fails.
    pub fn kind(&self) -> &'static str {
        match self {
            QuizError::NotFound { .. } => "not_found",
            QuizError::Validation(_) => "validation",
            QuizError::Conflict(_) => "conflict",
            QuizError::Upstream { .. } => "upstream",
            QuizError::Store(_) => "store",
        }
    }
}

/// Errors returned by a [`ContentGenerator`](crate::traits::ContentGenerator).
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Transport failure or non-success response from the backing model.
    #[error("transport error: {0}")]
    Transport(String),

    /// The generator answered, but not with the expected structure.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors returned by a [`Store`](crate::store::Store) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint was violated.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => QuizError::NotFound { entity, id },
            StoreError::AlreadyExists(what) => QuizError::Conflict(what),
            StoreError::Backend(msg) => QuizError::Store(msg),
        }
    }
}
