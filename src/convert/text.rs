//! Plain-text converter.

use crate::error::Result;
use crate::model::{Document, Fragment, FragmentSource, Metadata, PageResult, PageRoute, ProcessingMethod};
use std::path::Path;

use super::DocumentConverter;

/// Turns every non-empty line of a UTF-8 text file into a paragraph.
///
/// Lines are trimmed. Fragment ids are `line_{n}` with `n` the 1-based line
/// number in the file, so skipped blank lines leave gaps.
#[derive(Debug, Clone, Default)]
pub struct TextConverter {
    _private: (),
}

impl TextConverter {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Convert text already in memory.
    pub fn convert_str(&self, text: &str, metadata: Metadata) -> Document {
        let fragments = text
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let line = line.trim();
                (!line.is_empty()).then(|| {
                    Fragment::paragraph(line, FragmentSource::PlainText)
                        .on_page(1)
                        .with_id(format!("line_{}", i + 1))
                })
            })
            .collect();

        let mut document = Document::new(Metadata {
            page_count: 1,
            ..metadata
        });
        document.add_page(PageResult::new(1, PageRoute::PlainText, fragments));
        document
    }
}

impl DocumentConverter for TextConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn convert(&self, path: &Path) -> Result<Document> {
        let text = std::fs::read_to_string(path)?;
        let metadata = Metadata::from_path(path, ProcessingMethod::TextExtraction);
        let document = self.convert_str(&text, metadata);
        log::info!(
            "Read {} lines of text from {}",
            document.fragment_count(),
            path.display()
        );
        Ok(document)
    }
}
