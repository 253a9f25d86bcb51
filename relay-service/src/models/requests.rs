//! Request and response bodies of the relay endpoints.
//!
//! Every string field defaults to empty when absent so that missing and
//! blank values fail the same validation rule.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Successful reply of every relay endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayResponse {
    pub result: String,
}

/// What to do with uploaded media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTask {
    Transcribe,
    /// Anything other than `transcribe`, including no task at all.
    Recap,
}

impl From<Option<&str>> for MediaTask {
    fn from(task: Option<&str>) -> Self {
        match task {
            Some("transcribe") => MediaTask::Transcribe,
            _ => MediaTask::Recap,
        }
    }
}

/// Kind of content requested from `/api/create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateKind {
    Novel,
    SocialContent,
    Other(String),
}

impl CreateKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "novel" => CreateKind::Novel,
            "social_content" => CreateKind::SocialContent,
            other => CreateKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaProcessRequest {
    #[validate(
        length(min = 1, message = "media cannot be empty"),
        custom(function = "validate_base64")
    )]
    pub media: String,
    #[validate(length(min = 1, message = "mimeType cannot be empty"))]
    pub mime_type: String,
    pub task: Option<String>,
}

impl MediaProcessRequest {
    pub fn task(&self) -> MediaTask {
        MediaTask::from(self.task.as_deref())
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslateRequest {
    #[validate(length(min = 1, message = "text cannot be empty"))]
    pub text: String,
    #[validate(length(min = 1, message = "targetLang cannot be empty"))]
    pub target_lang: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl TranslateRequest {
    /// Content type named in the prompt; plain `text` when unspecified.
    pub fn kind(&self) -> &str {
        non_blank(self.kind.as_deref()).unwrap_or("text")
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateRequest {
    #[validate(length(min = 1, message = "topic cannot be empty"))]
    pub topic: String,
    #[validate(length(min = 1, message = "lang cannot be empty"))]
    pub lang: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl CreateRequest {
    /// Requested kind; generic `content` when unspecified.
    pub fn kind(&self) -> CreateKind {
        CreateKind::parse(non_blank(self.kind.as_deref()).unwrap_or("content"))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SubGenRequest {
    #[validate(length(min = 1, message = "text cannot be empty"))]
    pub text: String,
}

/// The value as sent, or `None` when it is absent or only whitespace.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Encoded bytes checked per step; a multiple of 4 so chunks align with
/// base64 quanta.
const BASE64_CHECK_CHUNK: usize = 16 * 1024;

/// Checks `media` is standard padded base64 without materialising the
/// decoded payload.
fn validate_base64(media: &str) -> Result<(), ValidationError> {
    let invalid = || {
        let mut err = ValidationError::new("base64");
        err.message = Some("media must be standard base64".into());
        err
    };

    let mut scratch = [0u8; BASE64_CHECK_CHUNK / 4 * 3];
    let mut chunks = media.as_bytes().chunks(BASE64_CHECK_CHUNK).peekable();
    while let Some(chunk) = chunks.next() {
        // Padding may only close the final quantum
        if chunks.peek().is_some() && chunk.contains(&b'=') {
            return Err(invalid());
        }
        STANDARD
            .decode_slice(chunk, &mut scratch)
            .map_err(|_| invalid())?;
    }
    Ok(())
}
