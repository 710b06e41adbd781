//! Text-generation client.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

use super::types::{GenerationRequest, ResponseFormat};
use crate::config::AssistantConfig;

/// Anything that turns a prompt into text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, request: GenerationRequest) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP client for the Gemini `generateContent` API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiClient {
    /// Create a client for `model` at `endpoint`.
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            client: Client::new(),
        }
    }

    /// Build a client from config, reading the key from the environment.
    pub fn from_config(config: &AssistantConfig) -> crate::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::warn!(
                "{} environment variable not set. AI features will not work.",
                config.api_key_env
            );
        }

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("API key not configured"))?;

        let body = GenerateContentRequest::from(&request);
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to reach the model API")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Request failed: {} {}",
                response.status(),
                response.text().await.unwrap_or_default()
            ));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Malformed generateContent response")?;
        parsed
            .text()
            .ok_or_else(|| anyhow!("Model returned no text"))
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        let generation_config = match &request.format {
            ResponseFormat::Text => None,
            ResponseFormat::Json(schema) => Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema.clone(),
            }),
        };

        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config,
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
