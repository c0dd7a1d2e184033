//! PDF document converter.

use crate::error::Result;
use crate::model::Document;
use crate::processor::PdfProcessor;
use std::path::Path;
use std::sync::Arc;

use super::DocumentConverter;

/// Converts PDFs through the hybrid page router.
#[derive(Clone)]
pub struct PdfConverter {
    processor: Arc<PdfProcessor>,
}

impl PdfConverter {
    /// Create a PDF converter around a shared processor.
    pub fn new(processor: Arc<PdfProcessor>) -> Self {
        Self { processor }
    }
}

impl DocumentConverter for PdfConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn convert(&self, path: &Path) -> Result<Document> {
        self.processor.process_file(path)
    }
}
