//! Text extraction for ingested documents
//!
//! PDF parsing is delegated to the pdf-extract crate; this module only
//! dispatches on the declared content type and normalizes errors.

use std::fs;
use std::path::Path;

use docchat_core::{DocumentKind, Error, Result};

/// Extract plain UTF-8 text from a staged document file
pub fn extract_text(path: &Path, kind: DocumentKind) -> Result<String> {
    let text = match kind {
        DocumentKind::PdfFile => pdf_extract::extract_text(path)
            .map_err(|e| Error::Ingestion(format!("PDF extraction failed: {}", e)))?,
        DocumentKind::TextFile => fs::read_to_string(path)
            .map_err(|e| Error::Ingestion(format!("failed to read text file: {}", e)))?,
    };

    if text.trim().is_empty() {
        return Err(Error::Ingestion(
            "document contains no extractable text".to_string(),
        ));
    }

    Ok(text)
}
