//! OpenAI-compatible chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{ModelClient, ModelError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the model client.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Bearer token sent to the provider.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ModelConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("MODEL_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or_default(),
            base_url: std::env::var("MODEL_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("MODEL_NAME").unwrap_or(defaults.model),
            timeout: std::env::var("MODEL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Client for any `/chat/completions` endpoint speaking the OpenAI schema.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    config: ModelConfig,
}

impl OpenAiCompatClient {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelClient for OpenAiCompatClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, ModelError> {
        if self.config.api_key.is_empty() {
            return Err(ModelError::NotConfigured("MODEL_API_KEY is not set".into()));
        }

        let body = build_request_body(&self.config.model, system_prompt, user_message);

        tracing::debug!(model = %self.config.model, "calling model");

        let resp = self
            .http
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let json: Value = resp.json().await?;
        extract_content(&json)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

fn build_request_body(model: &str, system_prompt: &str, user_message: &str) -> Value {
    serde_json::json!({
        "model": model,
        "messages": [
            { "role": "system", "content": system_prompt },
            { "role": "user", "content": user_message }
        ],
    })
}

/// Pull `choices[0].message.content` out of a completions response.
fn extract_content(json: &Value) -> Result<String, ModelError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| ModelError::Malformed("no content in model response".into()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenAiCompatClient::new(ModelConfig {
            base_url: "http://localhost:11434/v1/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let body = build_request_body("m", "sys", "hi");
        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_extract_content() {
        let ok = serde_json::json!({"choices": [{"message": {"content": "*bows* Hello."}}]});
        assert_eq!(extract_content(&ok).unwrap(), "*bows* Hello.");

        let empty = serde_json::json!({"choices": []});
        assert!(matches!(extract_content(&empty), Err(ModelError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = OpenAiCompatClient::new(ModelConfig::default()).unwrap();
        let err = client.complete("sys", "hi").await.unwrap_err();
        assert!(matches!(err, ModelError::NotConfigured(_)));
    }
}
