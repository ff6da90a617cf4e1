//! Configuration types for the inference library

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, paths};

/// Endpoint configuration for the chat-completions client.
///
/// Built once at startup from persisted settings and environment defaults,
/// then handed to [`LlmClient`](crate::LlmClient). Nothing in this crate
/// reads the URL from global state at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL as configured (e.g. `https://api.cerebras.ai/v1`)
    pub base_url: String,
    /// Model used when a request does not name one
    pub model: String,
}

impl ApiConfig {
    /// Create a config for the given base URL with the default model
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: defaults::MODEL.to_string(),
        }
    }

    /// Override the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Full URL of the completions endpoint.
    ///
    /// A base that already ends in `/chat/completions` is used as-is;
    /// otherwise any trailing slash is dropped and the path is appended.
    pub fn completions_url(&self) -> String {
        let base = self.base_url.trim();
        if base.ends_with(paths::CHAT_COMPLETIONS) {
            return base.to_string();
        }
        format!("{}{}", base.trim_end_matches('/'), paths::CHAT_COMPLETIONS)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(defaults::API_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "https://api.cerebras.ai/v1");
        assert_eq!(config.model, "llama-4-scout-17b-16e-instruct");
        assert_eq!(
            config.completions_url(),
            "https://api.cerebras.ai/v1/chat/completions"
        );
    }

    #[test]
    fn test_trailing_slash_is_dropped() {
        let config = ApiConfig::new("http://localhost:1234/v1/");
        assert_eq!(
            config.completions_url(),
            "http://localhost:1234/v1/chat/completions"
        );
    }

    #[test]
    fn test_full_endpoint_kept() {
        let config = ApiConfig::new("https://example.test/v1/chat/completions");
        assert_eq!(
            config.completions_url(),
            "https://example.test/v1/chat/completions"
        );
    }

    #[test]
    fn test_with_model() {
        let config = ApiConfig::default().with_model("llama3.1-8b");
        assert_eq!(config.model, "llama3.1-8b");
    }
}
