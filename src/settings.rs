use anyhow::Context;
use serde::Deserialize;

use crate::api::smartapi::SMARTAPI_BASE_URL;
use crate::indicators::IndicatorConfig;
use crate::notify::telegram::TELEGRAM_BASE_URL;
use crate::strategy::{SignalConfig, DEFAULT_QUANTITY};

const ENV_PREFIX: &str = "INDEXBOT";

/// Runtime settings, read from `INDEXBOT_*` environment variables
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Pre-issued broker session token
    #[serde(default)]
    pub jwt_token: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub telegram_bot_token: Option<String>,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
    #[serde(default = "default_telegram_base_url")]
    pub telegram_base_url: String,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_trailing_percent")]
    pub trailing_percent: f64,
}

fn default_api_base_url() -> String {
    SMARTAPI_BASE_URL.to_string()
}

fn default_telegram_base_url() -> String {
    TELEGRAM_BASE_URL.to_string()
}

fn default_refresh_secs() -> u64 {
    10
}

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

fn default_trailing_percent() -> f64 {
    1.0
}

impl Settings {
    /// Load from the process environment (after `.env`, if present)
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env(config::Environment::with_prefix(ENV_PREFIX))
    }

    pub fn from_env(env: config::Environment) -> anyhow::Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(env)
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        if settings.refresh_secs == 0 {
            anyhow::bail!("{}_REFRESH_SECS must be at least 1", ENV_PREFIX);
        }

        Ok(settings)
    }

    /// Broker credentials, if both halves are configured
    pub fn broker_credentials(&self) -> Option<(String, String)> {
        Some((self.api_key.clone()?, self.jwt_token.clone()?))
    }

    pub fn telegram(&self) -> Option<(String, String)> {
        Some((self.telegram_bot_token.clone()?, self.telegram_chat_id.clone()?))
    }

    pub fn indicator_config(&self) -> IndicatorConfig {
        IndicatorConfig::default()
    }

    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig {
            trailing_percent: self.trailing_percent,
            ..SignalConfig::default()
        }
    }
}
