//! Error types for the store

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur reading or writing persisted state
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id
    #[error("Project not found: {0}")]
    NotFound(String),

    /// A record with this id already exists
    #[error("Project already exists: {0}")]
    Conflict(String),

    /// Input rejected before touching storage
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Storage key that cannot be mapped to a file
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
