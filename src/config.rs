use std::env;

use tracing::info;

use crate::constants;
use crate::error::{SageError, SageResult};

/// Endpoints, models and the API key used by every outbound call.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub gemini_url: String,
    pub api_key: String,
    pub summary_model: String,
    pub chat_model: String,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            store_url: constants::STEAM_STORE_URL.clone(),
            gemini_url: constants::GEMINI_API_URL.clone(),
            api_key: api_key.into(),
            summary_model: constants::SUMMARY_MODEL.clone(),
            chat_model: constants::CHAT_MODEL.clone(),
        }
    }

    /// Reads the API key from `GOOGLE_AI_KEY`. A missing or blank key is a hard error.
    pub fn from_env() -> SageResult<Self> {
        let api_key = env::var(constants::API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SageError::MissingEnv(constants::API_KEY_VAR))?;

        let config = Self::new(api_key);
        if config.has_custom_store_url() {
            info!("Using custom Steam store URL: {}", config.store_url);
        }
        Ok(config)
    }

    pub fn has_custom_store_url(&self) -> bool {
        self.store_url != constants::DEFAULT_STEAM_STORE_URL
    }

    pub fn with_store_url(mut self, url: impl Into<String>) -> Self {
        self.store_url = trim_slash(url.into());
        self
    }

    pub fn with_gemini_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_url = trim_slash(url.into());
        self
    }

    pub fn with_models(mut self, summary: impl Into<String>, chat: impl Into<String>) -> Self {
        self.summary_model = summary.into();
        self.chat_model = chat.into();
        self
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
