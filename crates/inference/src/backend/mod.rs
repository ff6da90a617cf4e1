//! Completion backend abstraction
//!
//! The orchestrator talks to a [`CompletionBackend`] rather than to the HTTP
//! client directly, so tests and alternative transports can stand in for the
//! hosted endpoint.

use async_trait::async_trait;

use crate::types::InvokeOptions;

/// Error types for completion calls
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    /// No credential has been supplied for this session
    #[error("API key is required")]
    CredentialMissing,

    /// The endpoint answered with a failure, or could not be reached.
    ///
    /// `status` is the HTTP status code, or `0` when no response arrived.
    #[error("{message}")]
    Api { message: String, status: u16 },
}

impl LlmError {
    /// A transport-level failure (no HTTP response)
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Api {
            message: format!("Network error: {}", err),
            status: 0,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::CredentialMissing => None,
        }
    }
}

/// Anything that can turn a prompt into generated text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &'static str;

    /// Run a single completion for `prompt`.
    ///
    /// One attempt per call; implementations do not retry or cache.
    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<String, LlmError>;
}
