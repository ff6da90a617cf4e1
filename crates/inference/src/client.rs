//! Chat-completions HTTP client
//!
//! Issues a single OpenAI-compatible `POST <base>/chat/completions` per call,
//! authorised with the session credential, and normalises the many response
//! and error shapes hosted providers return.

use async_trait::async_trait;

use crate::backend::{CompletionBackend, LlmError};
use crate::config::ApiConfig;
use crate::credential::CredentialStore;
use crate::types::{extract_error_message, extract_text, ChatRequest, InvokeOptions};

/// Client for a hosted chat-completions endpoint.
pub struct LlmClient {
    /// HTTP client for API requests
    http_client: reqwest::Client,
    /// Endpoint and default model
    config: ApiConfig,
    /// Shared session credential
    credentials: CredentialStore,
}

impl LlmClient {
    /// Create a client for `config` that authenticates with `credentials`
    pub fn new(config: ApiConfig, credentials: CredentialStore) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            config,
            credentials,
        }
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom timeouts)
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// The endpoint configuration in use
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send `prompt` as a single user message and return the generated text.
    pub async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<String, LlmError> {
        let key = self.credentials.get().ok_or(LlmError::CredentialMissing)?;

        let request = ChatRequest::from_prompt(prompt, &self.config.model, options);
        let url = self.config.completions_url();

        log::debug!(
            "LlmClient: sending {} char prompt to {} (model {})",
            prompt.len(),
            url,
            request.model
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(key.expose())
            .json(&request)
            .send()
            .await
            .map_err(LlmError::network)?;

        let status = response.status();
        if !status.is_success() {
            // The body may be empty or not JSON at all; either way fall back
            // to the status text.
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .as_ref()
                .and_then(extract_error_message)
                .unwrap_or_else(|| {
                    format!(
                        "API request failed: {}",
                        status.canonical_reason().unwrap_or("Unknown status")
                    )
                });

            log::warn!("LlmClient: endpoint returned {}: {}", status.as_u16(), message);
            return Err(LlmError::Api {
                message,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(LlmError::network)?;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap_or_else(|e| {
            log::warn!("LlmClient: success response was not JSON: {}", e);
            serde_json::Value::Null
        });

        let text = extract_text(&json);
        log::debug!("LlmClient: received {} chars", text.len());
        Ok(text)
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    fn name(&self) -> &'static str {
        "chat-completions"
    }

    async fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<String, LlmError> {
        LlmClient::invoke(self, prompt, options).await
    }
}
