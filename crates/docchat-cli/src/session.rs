//! Session state and the knowledge-base handle registry

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::debug;

use docchat_core::{Error, KnowledgeBase, Result, SearchConfig};
use docchat_gemini::{GeminiClient, GeminiConfig, GeminiEmbedder};
use docchat_kb::{DirVectorStore, DocumentKnowledgeBase, IngestConfig};

/// The triple a knowledge-base handle is cached by
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleKey {
    pub storage_dir: PathBuf,
    pub credential: String,
    pub model_id: String,
}

/// Trait for constructing knowledge-base handles.
///
/// Construction composes the chat provider, the vector store, and the
/// embedding provider. It must not touch the network: a bad credential
/// surfaces on first use, not here.
#[async_trait]
pub trait HandleFactory: Send + Sync {
    async fn create(&self, key: &HandleKey) -> Result<Arc<dyn KnowledgeBase>>;
}

/// Process-wide cache of knowledge-base handles, keyed by the
/// (directory, credential, model) triple.
///
/// Handle construction is treated as expensive, so an identical triple must
/// return the previously built handle. Reset invalidates by identity via
/// `invalidate_all`, not by key.
pub struct HandleRegistry {
    factory: Box<dyn HandleFactory>,
    cache: Mutex<HashMap<HandleKey, Arc<dyn KnowledgeBase>>>,
}

impl HandleRegistry {
    pub fn new(factory: Box<dyn HandleFactory>) -> Self {
        Self {
            factory,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached handle for this triple, constructing it on a miss
    pub async fn get_or_create(&self, key: &HandleKey) -> Result<Arc<dyn KnowledgeBase>> {
        {
            let cache = self
                .cache
                .lock()
                .map_err(|e| Error::Other(format!("Lock error: {}", e)))?;
            if let Some(handle) = cache.get(key) {
                debug!(model = %key.model_id, "reusing cached knowledge-base handle");
                return Ok(handle.clone());
            }
        }

        let handle = self.factory.create(key).await?;
        debug!(model = %key.model_id, dir = %key.storage_dir.display(), "constructed knowledge-base handle");

        let mut cache = self
            .cache
            .lock()
            .map_err(|e| Error::Other(format!("Lock error: {}", e)))?;
        cache.insert(key.clone(), handle.clone());
        Ok(handle)
    }

    /// Drop every cached handle
    pub fn invalidate_all(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

/// Factory wiring the Gemini-backed providers together
pub struct GeminiHandleFactory;

impl GeminiHandleFactory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GeminiHandleFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HandleFactory for GeminiHandleFactory {
    async fn create(&self, key: &HandleKey) -> Result<Arc<dyn KnowledgeBase>> {
        GeminiClient::validate_model(&key.model_id)?;

        let chat = GeminiClient::new(GeminiConfig::new(key.credential.clone()))?
            .with_model(key.model_id.clone());
        // The embedder's credential comes from the environment, set when the
        // user submitted the key.
        let embedder = GeminiEmbedder::from_env()?;
        let store = Arc::new(DirVectorStore::open(&key.storage_dir)?);

        Ok(Arc::new(DocumentKnowledgeBase::with_config(
            chat,
            embedder,
            store,
            IngestConfig::default(),
            SearchConfig::default(),
        )))
    }
}

/// All state scoped to one interactive session.
///
/// `reset` clears every field together; partial resets are not possible
/// through the public surface.
pub struct SessionState {
    pub credential: Option<String>,
    pub model_id: String,
    pub handle: Option<Arc<dyn KnowledgeBase>>,
    pub ingested: bool,
    pub ingested_file: Option<String>,
    storage: Option<TempDir>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            credential: None,
            model_id: GeminiClient::GEMINI_2_5_FLASH.to_string(),
            handle: None,
            ingested: false,
            ingested_file: None,
            storage: None,
        }
    }

    /// Fresh storage directory for this session, created on first use
    pub fn storage_dir(&mut self) -> Result<PathBuf> {
        if self.storage.is_none() {
            self.storage = Some(TempDir::new()?);
        }
        Ok(self
            .storage
            .as_ref()
            .map(|dir| dir.path().to_path_buf())
            .unwrap_or_default())
    }

    /// Clear credential, handle, storage directory, and ingestion flag as a
    /// unit. The model selection survives, matching the original front-end
    /// where the selector widget keeps its value across a reset.
    pub fn reset(&mut self) {
        self.credential = None;
        self.handle = None;
        self.ingested = false;
        self.ingested_file = None;
        // Dropping the TempDir removes the vector storage from disk
        self.storage = None;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
