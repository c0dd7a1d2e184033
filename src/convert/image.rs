//! Image converter: a single scanned page.

use crate::error::Result;
use crate::model::Document;
use crate::processor::PdfProcessor;
use std::path::Path;
use std::sync::Arc;

use super::DocumentConverter;

/// Sends PNG and JPEG files straight through the OCR pipeline.
#[derive(Clone)]
pub struct ImageConverter {
    processor: Arc<PdfProcessor>,
}

impl ImageConverter {
    pub fn new(processor: Arc<PdfProcessor>) -> Self {
        Self { processor }
    }
}

impl DocumentConverter for ImageConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["png", "jpg", "jpeg"]
    }

    fn name(&self) -> &str {
        "image"
    }

    fn convert(&self, path: &Path) -> Result<Document> {
        self.processor.process_image_file(path)
    }
}
