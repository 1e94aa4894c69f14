//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A chunk of document text stored alongside its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
}

/// A record returned from a similarity search, with its relevance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: VectorRecord,
    pub score: f32,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: Some(0.0),
        }
    }
}

/// Trait for vector stores
///
/// A store is bound to one session's storage directory and holds the chunks
/// of at most one ingested document.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a batch of records, returning their ids
    async fn store_batch(&self, records: Vec<VectorRecord>) -> Result<Vec<String>>;

    /// Search for the records most similar to a query embedding
    async fn search_by_vector(
        &self,
        vector: &[f32],
        config: &SearchConfig,
    ) -> Result<Vec<ScoredRecord>>;

    /// Get the total number of stored records
    async fn count(&self) -> Result<usize>;

    /// Remove all records from the store
    async fn clear(&self) -> Result<()>;
}
