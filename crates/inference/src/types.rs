//! Common types for inference operations

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, LEGACY_OPTION_KEYS};

/// Chat message (text only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// A `user` role message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Caller-supplied options for a single invocation.
///
/// Unset fields fall back to the client defaults. `extra` carries any other
/// request fields through to the endpoint unchanged, except the legacy keys
/// listed in [`LEGACY_OPTION_KEYS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvokeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl InvokeOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Add a pass-through field
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Chat completion request (OpenAI-compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatRequest {
    /// Build a single user-message request.
    ///
    /// Caller options win over defaults. Legacy keys are stripped from the
    /// pass-through fields, as are any that would shadow a typed field.
    pub fn from_prompt(prompt: &str, default_model: &str, options: &InvokeOptions) -> Self {
        let mut extra = options.extra.clone();
        for key in LEGACY_OPTION_KEYS {
            extra.remove(*key);
        }
        for key in ["model", "max_tokens", "temperature", "top_p"] {
            extra.remove(key);
        }

        Self {
            model: options
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: options.max_tokens.unwrap_or(defaults::MAX_TOKENS),
            temperature: options.temperature.unwrap_or(defaults::TEMPERATURE),
            top_p: options.top_p,
            extra,
        }
    }
}

/// Pull generated text out of a completions response.
///
/// Providers disagree on the shape, so this tries, in order,
/// `choices[0].message.content`, `choices[0].text` and a top-level `text`,
/// and settles for an empty string.
pub fn extract_text(response: &serde_json::Value) -> String {
    let first_choice = response.get("choices").and_then(|c| c.get(0));

    first_choice
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            first_choice
                .and_then(|c| c.get("text"))
                .and_then(|t| t.as_str())
                .filter(|s| !s.is_empty())
        })
        .or_else(|| response.get("text").and_then(|t| t.as_str()))
        .unwrap_or("")
        .to_string()
}

/// Pull a human-readable message out of an error body, if the server sent one.
///
/// Accepts `{"error":{"message":..}}`, `{"error":".."}` and `{"message":..}`.
pub fn extract_error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error");
    error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .or_else(|| error.and_then(|e| e.as_str()))
        .or_else(|| body.get("message").and_then(|m| m.as_str()))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request = ChatRequest::from_prompt("hello", "default-model", &InvokeOptions::default());
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "default-model");
        assert_eq!(body["messages"], json!([{ "role": "user", "content": "hello" }]));
        assert_eq!(body["max_tokens"], 1000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_caller_options_override_defaults() {
        let options = InvokeOptions::default()
            .with_model("llama3.1-8b")
            .with_max_tokens(250)
            .with_temperature(0.2)
            .with_top_p(0.9)
            .with_extra("stop", json!(["\n\n"]));
        let body =
            serde_json::to_value(ChatRequest::from_prompt("hi", "default-model", &options)).unwrap();

        assert_eq!(body["model"], "llama3.1-8b");
        assert_eq!(body["max_tokens"], 250);
        assert_eq!(body["stop"], json!(["\n\n"]));
        assert!((body["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_legacy_keys_stripped() {
        let options = InvokeOptions::default()
            .with_extra("studio", json!("code"))
            .with_extra("maxTokens", json!(500))
            .with_extra("topP", json!(0.5))
            .with_extra("prompt", json!("stale"))
            .with_extra("messages", json!([]));
        let body =
            serde_json::to_value(ChatRequest::from_prompt("hi", "m", &options)).unwrap();
        let object = body.as_object().unwrap();

        for key in ["studio", "maxTokens", "topP", "prompt"] {
            assert!(!object.contains_key(key), "{} should be stripped", key);
        }
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_extract_message_content() {
        let response = json!({ "choices": [{ "message": { "content": "primary" }, "text": "fallback" }] });
        assert_eq!(extract_text(&response), "primary");
    }

    #[test]
    fn test_extract_choice_text_fallback() {
        let response = json!({ "choices": [{ "text": "completion" }], "text": "top" });
        assert_eq!(extract_text(&response), "completion");
    }

    #[test]
    fn test_extract_top_level_text_fallback() {
        assert_eq!(extract_text(&json!({ "text": "top" })), "top");
        assert_eq!(extract_text(&json!({ "choices": [] , "text": "top" })), "top");
    }

    #[test]
    fn test_extract_empty_when_nothing_matches() {
        assert_eq!(extract_text(&json!({ "id": "cmpl-1" })), "");
        assert_eq!(extract_text(&serde_json::Value::Null), "");
    }

    #[test]
    fn test_extract_error_message_shapes() {
        assert_eq!(
            extract_error_message(&json!({ "error": { "message": "rate limited" } })).as_deref(),
            Some("rate limited")
        );
        assert_eq!(
            extract_error_message(&json!({ "error": "bad key" })).as_deref(),
            Some("bad key")
        );
        assert_eq!(
            extract_error_message(&json!({ "message": "nope" })).as_deref(),
            Some("nope")
        );
        assert_eq!(extract_error_message(&json!({ "error": {} })), None);
    }
}
