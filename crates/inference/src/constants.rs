//! Inference constants
//!
//! Single source of truth for endpoint paths and request defaults.

/// Default values for chat-completion requests
pub mod defaults {
    /// Base URL used when neither settings nor environment provide one
    pub const API_BASE_URL: &str = "https://api.cerebras.ai/v1";
    /// Model identifier sent when the caller does not choose one
    pub const MODEL: &str = "llama-4-scout-17b-16e-instruct";
    /// Default completion length
    pub const MAX_TOKENS: u32 = 1000;
    /// Default sampling temperature
    pub const TEMPERATURE: f32 = 0.7;
}

/// Endpoint paths
pub mod paths {
    /// Suffix appended to the configured base URL
    pub const CHAT_COMPLETIONS: &str = "/chat/completions";
}

/// Option keys from older callers that the completions endpoint rejects.
///
/// These are removed from the pass-through fields before a request is sent.
pub const LEGACY_OPTION_KEYS: &[&str] = &["prompt", "studio", "maxTokens", "topP", "messages"];
