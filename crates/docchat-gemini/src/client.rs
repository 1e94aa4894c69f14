//! Gemini chat-model client implementation

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use docchat_core::{ChatProvider, Error, GenerationConfig, GenerationResult, Result};

use crate::config::GeminiConfig;
use crate::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationParams, Part,
    is_credential_rejection, parse_error_body,
};

/// Gemini chat client
///
/// Construction never touches the network; a bad key or unreachable endpoint
/// only shows up on the first `generate` call.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
    current_model: String,
}

impl GeminiClient {
    /// Model constants
    pub const GEMINI_2_5_FLASH: &'static str = "gemini-2.5-flash";
    pub const GEMINI_2_5_PRO: &'static str = "gemini-2.5-pro";
    pub const GEMINI_1_5_FLASH: &'static str = "gemini-1.5-flash";

    /// The chat models this client knows how to drive
    pub const SUPPORTED_MODELS: [&'static str; 3] = [
        Self::GEMINI_2_5_FLASH,
        Self::GEMINI_2_5_PRO,
        Self::GEMINI_1_5_FLASH,
    ];

    /// Create a new Gemini client from configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            current_model: Self::GEMINI_2_5_FLASH.to_string(),
        })
    }

    /// Create a new Gemini client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.current_model = model_id.into();
        self
    }

    /// Reject model ids outside the supported set
    pub fn validate_model(model_id: &str) -> Result<()> {
        if Self::SUPPORTED_MODELS.contains(&model_id) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "unsupported model id: {} (supported: {})",
                model_id,
                Self::SUPPORTED_MODELS.join(", ")
            )))
        }
    }

    /// Perform the actual generation request
    async fn perform_generation(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationParams {
                max_output_tokens: config.max_output_tokens,
                temperature: config.temperature,
            }),
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_url, config.model_id, self.config.api_key
        );

        debug!(model = %config.model_id, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = parse_error_body(&error_text);

            if is_credential_rejection(status, &message) {
                return Err(Error::Credential(message));
            }
            return Err(Error::Query(format!(
                "Gemini API request failed with status {}: {}",
                status, message
            )));
        }

        let data: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let answer = data
            .candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    candidates.swap_remove(0).content
                }
            })
            .and_then(|content| content.parts)
            .map(|parts| {
                parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(Error::Query(
                "Gemini API returned no text in the response candidates".to_string(),
            ));
        }

        Ok(answer.trim().to_string())
    }
}

#[async_trait]
impl ChatProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.current_model.clone(),
            ..Default::default()
        };
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let generation_future = self.perform_generation(prompt, config);

        let text = match timeout(config.timeout, generation_future).await {
            Ok(result) => result?,
            Err(_) => return Err(Error::Timeout("Request timed out".to_string())),
        };

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
        })
    }

    fn model_id(&self) -> &str {
        &self.current_model
    }
}
