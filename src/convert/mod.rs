//! Document converter module: one converter per input format.
//!
//! Converters are registered by file extension and dispatched on the
//! extension of the input path.
//!
//! # Example
//!
//! ```no_run
//! use documentor::convert::{ConvertOptions, ConverterRegistry};
//! use documentor::{OcrConfig, ProcessOptions};
//! use std::path::Path;
//!
//! fn main() -> documentor::Result<()> {
//!     let config = OcrConfig::from_env()?;
//!     let registry = ConverterRegistry::with_defaults(&config, ProcessOptions::default())?;
//!
//!     let result = registry.convert_to(Path::new("scan.pdf"), &ConvertOptions::default())?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod image;
mod pdf;
mod text;

pub use self::image::ImageConverter;
pub use self::pdf::PdfConverter;
pub use self::text::TextConverter;

use crate::config::OcrConfig;
use crate::error::{Error, Result};
use crate::model::Document;
use crate::parser::ProcessOptions;
use crate::processor::PdfProcessor;
use crate::render::{self, JsonFormat, RenderOptions};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Options for rendering a converted document.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Rendering options
    pub render: RenderOptions,

    /// Output format
    pub output_format: OutputFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON structure
    #[default]
    Json,

    /// Markdown format
    Markdown,

    /// Plain text
    Text,
}

impl OutputFormat {
    /// MIME type of the rendered output.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Markdown => "text/markdown",
            Self::Text => "text/plain",
        }
    }

    /// Conventional file extension of the rendered output.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Text => "txt",
        }
    }
}

/// A converted and rendered document.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Rendered content
    pub content: String,

    /// The converted document
    pub document: Document,

    /// MIME type of the content
    pub mime_type: &'static str,
}

impl ConvertResult {
    /// Render `document` according to `options`.
    pub fn render(document: Document, options: &ConvertOptions) -> Result<Self> {
        let content = match options.output_format {
            OutputFormat::Json => render::to_json(&document, JsonFormat::Pretty)?,
            OutputFormat::Markdown => render::to_markdown(&document, &options.render)?,
            OutputFormat::Text => render::to_text(&document, &options.render)?,
        };
        Ok(Self {
            content,
            document,
            mime_type: options.output_format.mime_type(),
        })
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new input format.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert a file at the given path.
    fn convert(&self, path: &Path) -> Result<Document>;

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
///
/// The registry maps file extensions to converters and provides
/// convenient methods for converting documents.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the PDF, image and text converters, all
    /// sharing one processor built from `config`.
    pub fn with_defaults(config: &OcrConfig, options: ProcessOptions) -> Result<Self> {
        let processor = Arc::new(PdfProcessor::from_config(config, options)?);
        Ok(Self::with_processor(processor))
    }

    /// Create a registry with the default converters around an existing processor.
    pub fn with_processor(processor: Arc<PdfProcessor>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfConverter::new(Arc::clone(&processor))));
        registry.register(Arc::new(ImageConverter::new(processor)));
        registry.register(Arc::new(TextConverter::new()));
        registry
    }

    /// Register a converter.
    ///
    /// The converter will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters.insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name.insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension (with or without the leading dot).
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters
            .get(&ext.trim_start_matches('.').to_lowercase())
            .cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.get_by_extension(ext).is_some()
    }

    /// Check if a path has a supported extension.
    pub fn supports_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.supports(ext))
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Convert a file using the converter registered for its extension.
    pub fn convert(&self, path: &Path) -> Result<Document> {
        if !path.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a file: {}", path.display()),
            )));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedExtension("(none)".into()))?;

        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedExtension(format!(".{}", ext.to_lowercase())))?;

        log::debug!("Converting {} with the {} converter", path.display(), converter.name());
        converter.convert(path)
    }

    /// Convert a file and render it.
    pub fn convert_to(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let document = self.convert(path)?;
        ConvertResult::render(document, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TextConverter::new()));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new().with_format(OutputFormat::Text);
        assert_eq!(options.output_format, OutputFormat::Text);
        assert_eq!(ConvertOptions::default().output_format, OutputFormat::Json);
    }

    #[test]
    fn test_output_format_details() {
        assert_eq!(OutputFormat::Markdown.mime_type(), "text/markdown");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }

    #[test]
    fn test_default_registry_handles_text_only() {
        let registry = ConverterRegistry::default();
        assert!(registry.supports("txt"));
        assert!(registry.supports(".TXT"));
        assert!(!registry.supports("pdf"));
        assert_eq!(registry.get_by_name("text").map(|c| c.name().to_string()), Some("text".into()));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        std::fs::write(&path, b"PK").unwrap();

        let registry = ConverterRegistry::default();
        let err = registry.convert(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtension(ref ext) if ext == ".docx"));
    }

    #[test]
    fn test_missing_file() {
        let registry = ConverterRegistry::default();
        let err = registry.convert(Path::new("/nonexistent/file.txt")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
