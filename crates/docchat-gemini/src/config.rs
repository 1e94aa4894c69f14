//! Gemini configuration

use docchat_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Default API base, overridable for tests or proxies
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_url: String,
}

impl GeminiConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .map_err(|_| {
                Error::Configuration(
                    "GEMINI_API_KEY or GOOGLE_API_KEY environment variable not found".to_string(),
                )
            })?;

        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self { api_key, api_url })
    }

    /// Create configuration with an explicit key
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}
