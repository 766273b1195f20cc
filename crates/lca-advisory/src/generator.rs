//! Text generation seam and the Gemini REST client

use crate::error::AdvisoryError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Upstream error bodies are truncated to this many characters
const MAX_ERROR_BODY: usize = 512;

/// Sampling parameters for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Top-k sampling
    pub top_k: u32,
    /// Output cap
    pub max_output_tokens: u32,
}

impl GenerationSettings {
    /// Settings for the sectioned narrative
    #[must_use]
    pub fn insights(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }

    /// Settings for the short tip list
    #[must_use]
    pub fn tips(model: impl Into<String>) -> Self {
        Self {
            max_output_tokens: 512,
            ..Self::insights(model)
        }
    }
}

/// Produces free text from a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`
    ///
    /// # Errors
    /// [`AdvisoryError`] for missing credentials, transport or upstream failures.
    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<String, AdvisoryError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, AdvisoryError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(AdvisoryError::MalformedResponse("no candidate text".to_string()))
        } else {
            Ok(text)
        }
    }
}

/// Gemini `generateContent` client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client
    ///
    /// An empty or absent key makes every call fail fast with
    /// [`AdvisoryError::MissingCredential`].
    ///
    /// # Errors
    /// [`AdvisoryError::Transport`] if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AdvisoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisoryError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Whether a key is configured
    #[inline]
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<String, AdvisoryError> {
        let key = self.api_key.as_deref().ok_or(AdvisoryError::MissingCredential)?;

        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                top_p: settings.top_p,
                top_k: settings.top_k,
                max_output_tokens: settings.max_output_tokens,
            },
        };

        tracing::debug!(model = %settings.model, prompt_len = prompt.len(), "Requesting generation");
        let resp = self
            .client
            .post(self.url(&settings.model))
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: String = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            return Err(AdvisoryError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tips_settings_only_shrink_output() {
        let insights = GenerationSettings::insights("m");
        let tips = GenerationSettings::tips("m");
        assert_eq!(insights.max_output_tokens, 1024);
        assert_eq!(tips.max_output_tokens, 512);
        assert_eq!(tips.temperature, insights.temperature);
        assert_eq!(tips.top_k, 40);
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: "hi" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: 10,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 10);
        assert_eq!(json["generationConfig"]["topK"], 40);
    }

    #[test]
    fn response_text_concatenates_parts() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.into_text().unwrap(), "ab");
    }

    #[test]
    fn empty_response_is_malformed() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(resp.into_text(), Err(AdvisoryError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = GeminiClient::new("http://127.0.0.1:9", Some("  ".into()), Duration::from_secs(1)).unwrap();
        assert!(!client.has_credential());
        let err = client
            .generate("prompt", &GenerationSettings::tips("m"))
            .await
            .unwrap_err();
        assert_eq!(err, AdvisoryError::MissingCredential);
    }

    #[test]
    fn url_trims_trailing_slash() {
        let client = GeminiClient::new("http://host/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("gemini-2.0-flash"), "http://host/v1beta/models/gemini-2.0-flash:generateContent");
    }
}
