//! Error types for the document store library.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A transaction could not commit after exhausting its retry budget
    #[error("Transaction conflict: gave up after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
