//! Knowledge-base contract
//!
//! The `KnowledgeBase` trait is the seam between the front-end and the
//! ingestion-and-chat machinery: one operation to add a document by path,
//! one to ask a question against whatever has been added.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Content-type hint for an ingested document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PdfFile,
    TextFile,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::PdfFile => "pdf_file",
            DocumentKind::TextFile => "text_file",
        }
    }

    /// Infer the kind from a filename extension
    pub fn from_filename(name: &str) -> Result<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(DocumentKind::PdfFile)
        } else if lower.ends_with(".txt") || lower.ends_with(".md") {
            Ok(DocumentKind::TextFile)
        } else {
            Err(Error::InvalidInput(format!(
                "unsupported document type: {}",
                name
            )))
        }
    }
}

/// Result of a successful ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub source: String,
    pub chunks_indexed: usize,
}

/// Trait for knowledge bases
///
/// Implementations own chunking, embedding invocation, vector indexing,
/// retrieval, and prompt construction. Callers only ever see `add` and
/// `chat`.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Extract, chunk, embed, and index one document's content
    async fn add(&self, path: &Path, kind: DocumentKind) -> Result<IngestReport>;

    /// Answer a question grounded in the indexed content
    async fn chat(&self, question: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(
            DocumentKind::from_filename("report.pdf").unwrap(),
            DocumentKind::PdfFile
        );
        assert_eq!(
            DocumentKind::from_filename("NOTES.TXT").unwrap(),
            DocumentKind::TextFile
        );
        assert!(DocumentKind::from_filename("slides.pptx").is_err());
    }

    #[test]
    fn test_kind_hint_strings() {
        assert_eq!(DocumentKind::PdfFile.as_str(), "pdf_file");
        assert_eq!(DocumentKind::TextFile.as_str(), "text_file");
    }
}
