//! Generative model provider abstraction.
//!
//! Handlers talk to a `GenerativeProvider` trait object so the Gemini
//! backend can be swapped for the mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Response blocked: {0}")]
    Blocked(String),

    #[error("Model returned no candidates")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Inline binary payload, base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One part of a conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Parts this relay does not interpret (function calls, file refs).
    Other(serde_json::Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

/// A conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

/// User input for a generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum UserContent {
    /// Plain text, sent as a single-part user turn.
    Text(String),
    /// Pre-built turns carrying inline media, sent unchanged.
    Media(Vec<Content>),
}

impl UserContent {
    pub fn is_media(&self) -> bool {
        matches!(self, UserContent::Media(_))
    }

    /// Shape the input into the turns submitted to the model.
    pub fn into_contents(self) -> Vec<Content> {
        match self {
            UserContent::Text(text) => vec![Content::user(vec![Part::text(text)])],
            UserContent::Media(contents) => contents,
        }
    }
}

/// A single model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    /// Sent as the model's system instruction.
    pub system_prompt: String,
    pub content: UserContent,
}

/// Trait for text generation backends (e.g., Gemini).
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Run one generation and return the text of the first candidate.
    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError>;

    /// Whether the provider is usable. Must not perform a generation.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
