//! Document knowledge base for docchat
//!
//! This crate implements the `KnowledgeBase` contract: text extraction,
//! chunking, embedding invocation, a directory-backed vector store,
//! retrieval, and prompt construction.

mod chunk;
mod engine;
mod extract;
mod store;


pub use chunk::chunk_text;
pub use engine::{DocumentKnowledgeBase, IngestConfig};
pub use extract::extract_text;
pub use store::DirVectorStore;

// Re-export core types for convenience
pub use docchat_core::{
    ChatProvider, DocumentKind, Embedder, Error, IngestReport, KnowledgeBase, Result,
    ScoredRecord, SearchConfig, VectorRecord, VectorStore,
};
