//! Core traits and types for docchat
//!
//! This crate defines the fundamental traits and types used across the
//! docchat system. It provides capability-facing interfaces for chat-model
//! providers, embedding providers, vector stores, and the knowledge-base
//! contract, making the system test-friendly and extensible.

pub mod chat_provider;
pub mod embedding;
pub mod error;
pub mod knowledge_base;
pub mod vector_store;

pub use chat_provider::{ChatProvider, GenerationConfig, GenerationResult};
pub use embedding::Embedder;
pub use error::{Error, Result};
pub use knowledge_base::{DocumentKind, IngestReport, KnowledgeBase};
pub use vector_store::{ScoredRecord, SearchConfig, VectorRecord, VectorStore};
