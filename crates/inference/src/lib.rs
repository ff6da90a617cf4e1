//! Credential-gated chat-completions client
//!
//! This library provides the network side of Creative Studio:
//! - **CredentialStore**: the session API key, held only in memory
//! - **LlmClient**: one OpenAI-compatible completion call per invocation
//! - **CompletionBackend**: the seam the orchestrator depends on
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_inference::{ApiConfig, CredentialStore, InvokeOptions, LlmClient};
//!
//! let credentials = CredentialStore::new();
//! credentials.set("sk-...");
//!
//! let client = LlmClient::new(ApiConfig::default(), credentials);
//! let text = client.invoke("Write a haiku", &InvokeOptions::default()).await?;
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod constants;
pub mod credential;
pub mod types;

// Re-exports for convenience
pub use backend::{CompletionBackend, LlmError};
pub use client::LlmClient;
pub use config::ApiConfig;
pub use credential::{ApiKey, CredentialStore};
pub use types::{extract_text, ChatMessage, ChatRequest, InvokeOptions};
