use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Inline media arrives base64-encoded inside the JSON body, so the
/// accepted body size is far above axum's default.
const DEFAULT_MAX_BODY_BYTES: usize = 500 * 1024 * 1024;
const DEFAULT_MAX_IN_FLIGHT: usize = 256;
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used by every endpoint unless its profile overrides it.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub limits: LimitsConfig,
    pub gemini: GeminiSettings,
    pub relay: RelayProfile,
}

/// Service sections read from the same layered sources as the common
/// config (`configuration.*` file, `APP__` environment).
#[derive(Debug, Default, Deserialize)]
pub struct RelaySections {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub relay: RelayProfile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
    /// Requests processed concurrently; further requests wait for a slot.
    pub max_in_flight: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: Secret::new(String::new()),
            base_url: GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiSettings {
    pub fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Model and prompt templates for each relay endpoint.
///
/// Templates interpolate `{placeholder}` names; see [`crate::prompts`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelayProfile {
    pub media_process: MediaProcessProfile,
    pub translate: TranslateProfile,
    pub create: CreateProfile,
    pub sub_gen: SubGenProfile,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MediaProcessProfile {
    pub model: String,
    pub transcribe: String,
    pub recap: String,
    /// Text part sent alongside the inline media.
    pub file_instruction: String,
}

impl Default for MediaProcessProfile {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            transcribe: "Transcribe word-for-word accurately and provide speaker labels if possible."
                .to_string(),
            recap: "Provide a high-quality cinematic recap of this media. Focus on key moments and emotional tone."
                .to_string(),
            file_instruction: "Analyze and process this file according to the instructions."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslateProfile {
    pub model: String,
    /// Placeholders: `{type}`, `{target_lang}`.
    pub template: String,
}

impl Default for TranslateProfile {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            template: "You are a professional translator. Translate this {type} to {target_lang}.\n\
                       Use natural conversational {target_lang}. Avoid formal endings like 'သည်', '၏' or 'ပါဝင်ပါသည်'.\n\
                       Maintain the original structure and emotional weight."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CreateProfile {
    pub model: String,
    /// Placeholders for all three: `{topic}`, `{lang}`; `generic` also `{type}`.
    pub novel: String,
    pub social_content: String,
    pub generic: String,
}

impl Default for CreateProfile {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            novel: "Write a deep, engaging 300,000+ character style story about {topic} in {lang}. Focus on vivid descriptions and world-building."
                .to_string(),
            social_content: "Write a viral video script and social media post about {topic} in {lang}. Include hooks and trending styles."
                .to_string(),
            generic: "Write a professional {type} about {topic} in {lang}. Be extremely detailed and creative."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubGenProfile {
    pub model: String,
    pub instruction: String,
}

impl Default for SubGenProfile {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            instruction: "Generate a perfectly timed SRT format content from the given input. Strictly follow SRT rules."
                .to_string(),
        }
    }
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let sections: RelaySections = core_config::load_layered()?;
        let api_key = env::var("API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok();

        Self::assemble(common, sections, api_key)
    }

    /// Combine loaded sections; a bare `API_KEY` wins over any configured key.
    pub fn assemble(
        common: core_config::Config,
        sections: RelaySections,
        api_key: Option<String>,
    ) -> Result<Self, AppError> {
        let mut gemini = sections.gemini;
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            gemini.api_key = Secret::new(key);
        }

        let config = Self {
            common,
            limits: sections.limits,
            gemini,
            relay: sections.relay,
        };
        config.ensure_usable()?;

        Ok(config)
    }

    fn ensure_usable(&self) -> Result<(), AppError> {
        if self.common.is_prod() && !self.gemini.is_configured() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "API_KEY is required in production but not set"
            )));
        }
        if self.limits.max_body_bytes == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "limits.max_body_bytes must be greater than zero"
            )));
        }
        if self.limits.max_in_flight == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "limits.max_in_flight must be greater than zero"
            )));
        }
        Ok(())
    }
}
