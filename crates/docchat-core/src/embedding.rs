//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Trait for hosted embedding providers.
///
/// The embedding model is fixed per provider instance and is distinct from
/// the chat model. Like `ChatProvider`, construction never touches the
/// network and credential problems surface on the first call.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, preserving order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding model ID being used
    fn model_id(&self) -> &str;
}
