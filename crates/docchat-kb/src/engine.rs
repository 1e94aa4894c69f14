//! Knowledge-base engine implementation

use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use docchat_core::{
    ChatProvider, DocumentKind, Embedder, Error, IngestReport, KnowledgeBase, Result,
    ScoredRecord, SearchConfig, VectorRecord, VectorStore,
};

use crate::chunk::chunk_text;
use crate::extract::extract_text;

/// Configuration for document ingestion
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Knowledge base composing a chat provider, an embedding provider, and a
/// vector store. This is the handle the session layer caches.
pub struct DocumentKnowledgeBase<C, E, V> {
    chat_provider: C,
    embedder: E,
    store: Arc<V>,
    ingest: IngestConfig,
    search: SearchConfig,
}

impl<C: ChatProvider, E: Embedder, V: VectorStore> DocumentKnowledgeBase<C, E, V> {
    /// Create a new knowledge base with default chunking and retrieval
    pub fn new(chat_provider: C, embedder: E, store: Arc<V>) -> Self {
        Self {
            chat_provider,
            embedder,
            store,
            ingest: IngestConfig::default(),
            search: SearchConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(
        chat_provider: C,
        embedder: E,
        store: Arc<V>,
        ingest: IngestConfig,
        search: SearchConfig,
    ) -> Self {
        Self {
            chat_provider,
            embedder,
            store,
            ingest,
            search,
        }
    }

    fn build_context(&self, results: &[ScoredRecord]) -> String {
        let mut context = String::new();

        for (i, scored) in results.iter().enumerate() {
            context.push_str(&format!("{}. ", i + 1));
            context.push_str(&scored.record.content);
            context.push_str("\n\n");
        }

        context
    }

    fn build_prompt(&self, context: &str, question: &str) -> String {
        let mut prompt = String::new();
        prompt.push_str(
            "You are a helpful assistant answering questions about a document \
             the user uploaded. Answer using only the excerpts below; if they \
             do not contain the answer, say so.\n\n",
        );
        prompt.push_str("Document excerpts:\n\n");
        prompt.push_str(context);
        prompt.push_str("---\n\n");
        prompt.push_str("Question: ");
        prompt.push_str(question);

        prompt
    }
}

#[cfg(test)]
impl<C, E, V> DocumentKnowledgeBase<C, E, V> {
    pub(crate) fn chat_provider_ref(&self) -> &C {
        &self.chat_provider
    }

    pub(crate) fn embedder_ref(&self) -> &E {
        &self.embedder
    }
}

#[async_trait]
impl<C, E, V> KnowledgeBase for DocumentKnowledgeBase<C, E, V>
where
    C: ChatProvider + 'static,
    E: Embedder + 'static,
    V: VectorStore + 'static,
{
    async fn add(&self, path: &Path, kind: DocumentKind) -> Result<IngestReport> {
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let text = extract_text(path, kind)?;
        let chunks = chunk_text(&text, self.ingest.chunk_size, self.ingest.chunk_overlap);
        debug!(source = %source, chunks = chunks.len(), "extracted and chunked document");

        let embeddings = self.embedder.embed(&chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Ingestion(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let total = chunks.len();
        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (content, embedding))| VectorRecord {
                id: Uuid::new_v4().to_string(),
                content,
                embedding,
                metadata: json!({
                    "source": source,
                    "kind": kind.as_str(),
                    "chunk_index": i,
                    "total_chunks": total,
                }),
            })
            .collect();

        self.store.store_batch(records).await?;
        info!(source = %source, chunks = total, "document indexed");

        Ok(IngestReport {
            source,
            chunks_indexed: total,
        })
    }

    async fn chat(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }

        let question_vectors = self.embedder.embed(&[question.to_string()]).await?;
        let question_vector = question_vectors
            .first()
            .ok_or_else(|| Error::Query("embedder returned no vector for the question".to_string()))?;

        let results = self
            .store
            .search_by_vector(question_vector, &self.search)
            .await?;
        debug!(matches = results.len(), "retrieved context chunks");

        let context = self.build_context(&results);
        let prompt = self.build_prompt(&context, question);

        let result = self.chat_provider.generate(&prompt).await?;
        Ok(result.text)
    }
}
