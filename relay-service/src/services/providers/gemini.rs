//! Gemini AI provider implementation.
//!
//! Calls `models/{model}:generateContent` on the Generative Language API
//! and unwraps the text of the first candidate.

use super::{Content, GenerationRequest, GenerativeProvider, Part, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Finish reasons for which the candidate carries no usable answer.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "LANGUAGE",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    /// API root including the version segment, e.g. `.../v1beta`.
    pub base_url: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            model,
            method
        )
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }
        if request.model.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "model name is empty".to_string(),
            ));
        }

        let url = self.api_url(&request.model, "generateContent");
        let media = request.content.is_media();

        let body = GenerateContentRequest {
            contents: request.content.into_contents(),
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(request.system_prompt)],
            }),
        };

        tracing::debug!(
            model = %request.model,
            media,
            turns = body.contents.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = api_error_message(&error_text);

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited(message));
            }

            let message = format!("Gemini API error {}: {}", status, message);
            if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
                return Err(ProviderError::InvalidRequest(message));
            }
            return Err(ProviderError::ApiError(message));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        extract_text(api_response)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.expose_secret().trim().is_empty() {
            Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Prefer the `error.message` of a Google API error body over the raw text.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Text of the first candidate, all answer text parts joined.
fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(match response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            Some(reason) => ProviderError::Blocked(format!("prompt blocked: {}", reason)),
            None => ProviderError::EmptyResponse,
        });
    };

    if let Some(reason) = candidate
        .finish_reason
        .as_deref()
        .filter(|reason| BLOCKING_FINISH_REASONS.contains(reason))
    {
        return Err(ProviderError::Blocked(format!(
            "candidate finished with {}",
            reason
        )));
    }

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text)
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

/// Response part. Non-text parts deserialize with `text: None`.
#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
    /// Set on reasoning summaries from thinking models.
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
