//! Gemini embedding provider implementation

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use docchat_core::{Embedder, Error, Result};

use crate::config::GeminiConfig;
use crate::wire::{
    BatchEmbedRequest, BatchEmbedResponse, EmbedContent, EmbedContentRequest, Part,
    is_credential_rejection, parse_error_body,
};

/// Dedicated embedding model, distinct from the chat models
pub const EMBEDDING_MODEL: &str = "gemini-embedding-001";

/// The batch endpoint caps requests at 100 contents
const MAX_BATCH: usize = 100;

/// Gemini embedding client.
///
/// The embedding model is fixed; the credential comes from the ambient
/// `GEMINI_API_KEY` environment variable in normal operation (`from_env`),
/// matching how the front-end exports the submitted key.
pub struct GeminiEmbedder {
    config: GeminiConfig,
    client: Client,
}

impl GeminiEmbedder {
    /// Create a new embedder with an explicit configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new embedder from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::new(config)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request_body = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: format!("models/{}", EMBEDDING_MODEL),
                    content: EmbedContent {
                        parts: vec![Part { text: text.clone() }],
                    },
                })
                .collect(),
        };

        let url = format!(
            "{}/models/{}:batchEmbedContents?key={}",
            self.config.api_url, EMBEDDING_MODEL, self.config.api_key
        );

        debug!(batch = texts.len(), "sending batchEmbedContents request");

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
            return Err(Error::Embedding(format!(
                "Gemini embedding request failed with status {}: {}",
                status, message
            )));
        }

        let data: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if data.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.embeddings.len()
            )));
        }

        Ok(data.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            vectors.extend(self.embed_batch(batch).await?);
        }
        Ok(vectors)
    }

    fn model_id(&self) -> &str {
        EMBEDDING_MODEL
    }
}
