use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint. Span export is disabled when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        load_layered()
    }

    pub fn is_prod(&self) -> bool {
        self.environment == Environment::Prod
    }
}

/// Deserialize `T` from the layered configuration sources.
///
/// Sources, lowest precedence first: an optional `configuration` file
/// (toml, yaml or json), `APP__`-prefixed environment variables with `__`
/// as the nesting separator, then the bare `PORT` and `ENVIRONMENT`
/// variables. A `.env` file is loaded into the environment beforehand.
pub fn load_layered<T: DeserializeOwned>() -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let port = match env::var("PORT") {
        Ok(raw) => Some(raw.trim().parse::<i64>().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("PORT must be a number, got {:?}: {}", raw, e))
        })?),
        Err(_) => None,
    };

    let config = Cfg::builder()
        .add_source(File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .set_override_option("port", port)?
        .set_override_option("environment", env::var("ENVIRONMENT").ok())?
        .build()?;

    Ok(config.try_deserialize()?)
}
