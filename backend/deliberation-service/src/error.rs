//! Error types for deliberation-service
//!
//! "Already voted" and "already liked" situations are deliberately not
//! errors: double votes surface as [`crate::services::VoteOutcome::AlreadyVoted`]
//! and like toggling is idempotent by construction.

use document_store::StoreError;
use thiserror::Error;

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// The target post or comment no longer exists
    #[error("Not found: {0}")]
    NotFound(String),

    /// The document lacks a capability the operation assumes
    /// (e.g. voting on a post without a poll block)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed caller input (out-of-range option index, empty text)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The store's transaction retry budget was exhausted; retryable
    #[error("Transaction conflict: {0}")]
    Conflict(#[source] StoreError),

    /// Document (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => ServiceError::Conflict(err),
            StoreError::Serialization(e) => ServiceError::Serialization(e),
        }
    }
}
