//! Directory-backed vector store

use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

use docchat_core::{Error, Result, ScoredRecord, SearchConfig, VectorRecord, VectorStore};

const STORE_FILE: &str = "vectors.json";

/// Vector store persisted as a JSON file under the session's storage
/// directory. Records live in memory; every mutation is flushed to disk.
pub struct DirVectorStore {
    records: RwLock<HashMap<String, VectorRecord>>,
    path: PathBuf,
}

impl DirVectorStore {
    /// Open (or create) the store rooted at a storage directory
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::Configuration(format!(
                "storage directory does not exist: {}",
                dir.display()
            )));
        }

        let path = dir.join(STORE_FILE);
        let mut records = HashMap::new();

        if path.exists() {
            let data = fs::read_to_string(&path)?;
            let loaded: Vec<VectorRecord> = serde_json::from_str(&data)
                .map_err(|e| Error::Serialization(e.to_string()))?;
            debug!(count = loaded.len(), "loaded persisted vectors");
            for record in loaded {
                records.insert(record.id.clone(), record);
            }
        }

        Ok(Self {
            records: RwLock::new(records),
            path,
        })
    }

    fn persist(&self, records: &HashMap<String, VectorRecord>) -> Result<()> {
        let all: Vec<&VectorRecord> = records.values().collect();
        let data =
            serde_json::to_string(&all).map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for DirVectorStore {
    async fn store_batch(&self, batch: Vec<VectorRecord>) -> Result<Vec<String>> {
        let mut records = self
            .records
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut ids = Vec::with_capacity(batch.len());
        for record in batch {
            ids.push(record.id.clone());
            records.insert(record.id.clone(), record);
        }

        self.persist(&records)?;
        Ok(ids)
    }

    async fn search_by_vector(
        &self,
        vector: &[f32],
        config: &SearchConfig,
    ) -> Result<Vec<ScoredRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut results: Vec<ScoredRecord> = records
            .values()
            .map(|record| ScoredRecord {
                score: Self::cosine_similarity(vector, &record.embedding),
                record: record.clone(),
            })
            .filter(|scored| {
                config
                    .score_threshold
                    .map_or(true, |threshold| scored.score >= threshold)
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(config.top_k);

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let records = self
            .records
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        Ok(records.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        records.clear();
        self.persist(&records)?;
        Ok(())
    }
}
