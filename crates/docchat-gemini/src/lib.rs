//! Gemini API integration for docchat
//!
//! This crate provides the chat-model provider and the embedding provider,
//! both backed by the Gemini REST API.

mod client;
mod config;
mod embedder;
mod wire;


pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use embedder::GeminiEmbedder;

// Re-export core types for convenience
pub use docchat_core::{ChatProvider, Embedder, Error, GenerationConfig, GenerationResult, Result};
