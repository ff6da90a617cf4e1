//! Error types for the studio engine

use studio_inference::LlmError;
use studio_store::StoreError;
use thiserror::Error;

/// Result type alias using StudioError
pub type Result<T> = std::result::Result<T, StudioError>;

/// Errors surfaced by a studio session
#[derive(Debug, Error)]
pub enum StudioError {
    /// A user-supplied field was rejected
    #[error("{message}")]
    Validation { field: String, message: String },

    /// No API key has been provided
    #[error("API key is required")]
    CredentialMissing,

    /// The completions endpoint failed; status 0 means no response
    #[error("{message}")]
    Api { message: String, status: u16 },

    /// No project with this id
    #[error("Project not found: {0}")]
    NotFound(String),

    /// One or more selected files exceed the size limit
    #[error("{0}")]
    AttachmentTooLarge(String),

    /// The selection would exceed the attachment limit
    #[error("Maximum {max} files allowed.")]
    TooManyAttachments { max: usize },

    /// A generation is already running in this session
    #[error("A generation is already in progress")]
    Busy,

    /// Storage failed to read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// A project with this id already exists
    #[error("Project already exists: {0}")]
    Conflict(String),

    /// I/O error outside the store (exports)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// Create a validation error for `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<LlmError> for StudioError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::CredentialMissing => Self::CredentialMissing,
            LlmError::Api { message, status } => Self::Api { message, status },
        }
    }
}

impl From<StoreError> for StudioError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Conflict(id) => Self::Conflict(id),
            StoreError::Validation(message) => Self::validation("input", message),
            other => Self::Storage(other.to_string()),
        }
    }
}
