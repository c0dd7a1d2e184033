//! Document-level types.

use super::{Fragment, FragmentKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a page's fragments were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRoute {
    /// Text embedded in the PDF was long enough to use directly
    SelectableText,
    /// Page was rendered and sent through layout detection + recognition
    Ocr,
    /// Lines of a plain-text file
    PlainText,
}

/// How a whole file was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    /// Plain-text file read line by line
    TextExtraction,
    /// PDF routed page by page
    #[default]
    PdfProcessing,
    /// Standalone image sent through the OCR pipeline
    Ocr,
}

/// Fragments produced for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Page number (1-indexed)
    pub number: u32,

    /// Route the page took
    pub route: PageRoute,

    /// Fragments in reading order
    pub fragments: Vec<Fragment>,
}

impl PageResult {
    pub fn new(number: u32, route: PageRoute, fragments: Vec<Fragment>) -> Self {
        Self {
            number,
            route,
            fragments,
        }
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.fragments
            .iter()
            .filter(|f| !f.is_empty())
            .map(Fragment::value)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A processed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// File and processing metadata
    pub metadata: Metadata,

    /// Processed pages, in page order
    pub pages: Vec<PageResult>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            pages: Vec::new(),
        }
    }

    /// Add a page result to the document.
    pub fn add_page(&mut self, page: PageResult) {
        self.pages.push(page);
    }

    /// Get a processed page by number (1-indexed).
    pub fn get_page(&self, number: u32) -> Option<&PageResult> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Iterate over every fragment in document order.
    pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.pages.iter().flat_map(|p| p.fragments.iter())
    }

    /// Total number of fragments.
    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(|p| p.fragments.len()).sum()
    }

    /// Count fragments of a given kind.
    pub fn count_kind(&self, kind: FragmentKind) -> usize {
        self.fragments().filter(|f| f.kind() == kind).count()
    }

    /// Count pages that took a given route.
    pub fn count_route(&self, route: PageRoute) -> usize {
        self.pages.iter().filter(|p| p.route == route).count()
    }

    /// Check if the document has any fragments.
    pub fn is_empty(&self) -> bool {
        self.fragment_count() == 0
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// File and processing metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// File name
    pub name: Option<String>,

    /// Lowercase extension with leading dot (e.g. ".pdf")
    pub extension: Option<String>,

    /// Full path as given
    pub file_path: Option<String>,

    /// File size in bytes
    pub file_size: Option<u64>,

    /// How the file was processed
    pub processing_method: ProcessingMethod,

    /// Total number of pages in the source (1 for images)
    pub page_count: u32,

    /// PDF version (e.g., "1.7")
    pub pdf_version: Option<String>,

    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Image width in pixels (image inputs only)
    pub image_width: Option<u32>,

    /// Image height in pixels (image inputs only)
    pub image_height: Option<u32>,
}

impl Metadata {
    /// Fill name, extension, path and size from a file path.
    pub fn from_path(path: &Path, method: ProcessingMethod) -> Self {
        Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            extension: path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy().to_lowercase())),
            file_path: Some(path.display().to_string()),
            file_size: std::fs::metadata(path).ok().map(|m| m.len()),
            processing_method: method,
            ..Default::default()
        }
    }

    /// Convert metadata to YAML frontmatter.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        if let Some(ref title) = self.title {
            lines.push(format!("title: \"{}\"", escape_yaml(title)));
        }
        if let Some(ref author) = self.author {
            lines.push(format!("author: \"{}\"", escape_yaml(author)));
        }
        if let Some(ref name) = self.name {
            lines.push(format!("source: \"{}\"", escape_yaml(name)));
        }
        if let Some(ref created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        if let Some(ref modified) = self.modified {
            lines.push(format!("modified: {}", modified.to_rfc3339()));
        }
        if let Some(ref version) = self.pdf_version {
            lines.push(format!("pdf_version: \"{}\"", escape_yaml(version)));
        }

        let method = match self.processing_method {
            ProcessingMethod::TextExtraction => "text_extraction",
            ProcessingMethod::PdfProcessing => "pdf_processing",
            ProcessingMethod::Ocr => "ocr",
        };
        lines.push(format!("processing_method: {}", method));
        lines.push(format!("pages: {}", self.page_count));

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
