//! # documentor
//!
//! Hybrid document processing for Rust.
//!
//! PDF pages that carry enough selectable text are split into paragraphs
//! directly. Every other page, and every standalone image, is rendered and
//! sent through a two-stage remote pipeline: a layout model finds typed
//! regions, a text-recognition model transcribes each region. The result is a
//! flat list of typed [`Fragment`]s per page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use documentor::{process_file, render, OcrConfig};
//!
//! fn main() -> documentor::Result<()> {
//!     // DOTS_OCR_* and QWEN_* variables name the two model servers
//!     let config = OcrConfig::from_env()?;
//!     let doc = process_file("scan.pdf", &config)?;
//!
//!     let markdown = render::to_markdown(&doc, &render::RenderOptions::default())?;
//!     println!("{}", markdown);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Hybrid routing**: selectable text first, OCR only where needed
//! - **Typed output**: titles, headers, list items, tables, formulas, captions
//! - **Pluggable stages**: layout detection, recognition and rasterization sit behind traits
//! - **Parallel text extraction**: uses Rayon for large documents
//! - **Multiple output formats**: JSON, Markdown, plain text

pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod ocr;
pub mod parser;
pub mod processor;
pub mod raster;
pub mod render;

// Re-export commonly used types
pub use config::{ApiConfig, EnvSource, OcrConfig};
pub use convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, OutputFormat,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat, SourceFormat};
pub use error::{Error, Result};
pub use model::{
    BBox, Block, Document, Fragment, FragmentKind, FragmentSource, LayoutCategory, Metadata,
    PageResult, PageRoute, ProcessingMethod,
};
pub use ocr::{BlockOrder, LayoutDetector, ScanPipeline, TextRecognizer};
pub use parser::{ErrorMode, PageSelection, PdfParser, ProcessOptions};
pub use processor::{predict_routes, PdfProcessor, RoutePrediction};
pub use raster::{PageRasterizer, PdftoppmRasterizer};
pub use render::{JsonFormat, RenderOptions};

use std::path::Path;

/// Process a PDF, image or text file with default options.
///
/// # Example
///
/// ```no_run
/// use documentor::{process_file, OcrConfig};
///
/// let config = OcrConfig::from_env().unwrap();
/// let doc = process_file("scan.png", &config).unwrap();
/// println!("Fragments: {}", doc.fragment_count());
/// ```
pub fn process_file<P: AsRef<Path>>(path: P, config: &OcrConfig) -> Result<Document> {
    process_file_with_options(path, config, ProcessOptions::default())
}

/// Process a file with custom options.
///
/// # Example
///
/// ```no_run
/// use documentor::{process_file_with_options, OcrConfig, PageSelection, ProcessOptions};
///
/// let config = OcrConfig::from_env().unwrap();
/// let options = ProcessOptions::new()
///     .strict()
///     .with_pages(PageSelection::parse("1-3").unwrap());
/// let doc = process_file_with_options("report.pdf", &config, options).unwrap();
/// ```
pub fn process_file_with_options<P: AsRef<Path>>(
    path: P,
    config: &OcrConfig,
    options: ProcessOptions,
) -> Result<Document> {
    let registry = ConverterRegistry::with_defaults(config, options)?;
    registry.convert(path.as_ref())
}

/// Extract plain text from a file, running OCR where needed.
pub fn extract_text<P: AsRef<Path>>(path: P, config: &OcrConfig) -> Result<String> {
    let doc = process_file(path, config)?;
    render::to_text(&doc, &RenderOptions::default())
}

/// Convert a file to Markdown.
pub fn to_markdown<P: AsRef<Path>>(path: P, config: &OcrConfig) -> Result<String> {
    let doc = process_file(path, config)?;
    render::to_markdown(&doc, &RenderOptions::default())
}

/// Convert a file to JSON.
pub fn to_json<P: AsRef<Path>>(path: P, config: &OcrConfig, format: JsonFormat) -> Result<String> {
    let doc = process_file(path, config)?;
    render::to_json(&doc, format)
}

/// Selectable text of every page of a PDF, without any OCR.
///
/// Pages without text yield `None`.
///
/// # Example
///
/// ```no_run
/// use documentor::selectable_text;
///
/// for (i, text) in selectable_text("report.pdf").unwrap().iter().enumerate() {
///     println!("page {}: {} chars", i + 1, text.as_deref().map_or(0, str::len));
/// }
/// ```
pub fn selectable_text<P: AsRef<Path>>(path: P) -> Result<Vec<Option<String>>> {
    let parser = PdfParser::open(path)?;
    Ok(parser
        .page_numbers()
        .into_iter()
        .map(|page| parser.selectable_text(page))
        .collect())
}

/// Builder for processing and rendering documents.
///
/// # Example
///
/// ```no_run
/// use documentor::{Documentor, OcrConfig};
///
/// let markdown = Documentor::new(OcrConfig::from_env()?)
///     .with_min_text_len(80)
///     .with_frontmatter()
///     .strict()
///     .process("report.pdf")?
///     .to_markdown()?;
/// # Ok::<(), documentor::Error>(())
/// ```
pub struct Documentor {
    config: OcrConfig,
    process_options: ProcessOptions,
    render_options: RenderOptions,
}

impl Documentor {
    /// Create a new builder for the given model servers.
    pub fn new(config: OcrConfig) -> Self {
        Self {
            config,
            process_options: ProcessOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Create a builder with model servers read from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(OcrConfig::from_env()?))
    }

    /// Abort on the first failing page.
    pub fn strict(mut self) -> Self {
        self.process_options = self.process_options.strict();
        self
    }

    /// Log and skip failing pages.
    pub fn lenient(mut self) -> Self {
        self.process_options = self.process_options.lenient();
        self
    }

    /// Disable parallel text extraction.
    pub fn sequential(mut self) -> Self {
        self.process_options = self.process_options.sequential();
        self
    }

    /// Send every page through OCR regardless of its selectable text.
    pub fn force_ocr(mut self) -> Self {
        self.process_options = self.process_options.force_ocr(true);
        self
    }

    /// Set the minimum selectable-text length for a page to skip OCR.
    pub fn with_min_text_len(mut self, len: usize) -> Self {
        self.process_options = self.process_options.with_min_text_len(len);
        self
    }

    /// Set the rasterization resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.process_options = self.process_options.with_dpi(dpi);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.process_options = self.process_options.with_pages(pages);
        self
    }

    /// Set the order of OCR fragments within a page.
    pub fn with_block_order(mut self, order: BlockOrder) -> Self {
        self.process_options = self.process_options.with_block_order(order);
        self
    }

    /// Replace all processing options.
    pub fn with_options(mut self, options: ProcessOptions) -> Self {
        self.process_options = options;
        self
    }

    /// Enable frontmatter in Markdown output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Keep page headers and footers in rendered output.
    pub fn with_page_furniture(mut self) -> Self {
        self.render_options = self.render_options.with_page_furniture(true);
        self
    }

    /// Replace all rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Process a file and return a result wrapper.
    pub fn process<P: AsRef<Path>>(self, path: P) -> Result<DocumentorResult> {
        let registry = ConverterRegistry::with_defaults(&self.config, self.process_options)?;
        let document = registry.convert(path.as_ref())?;
        Ok(DocumentorResult {
            document,
            render_options: self.render_options,
        })
    }
}

/// Result of processing a document.
#[derive(Debug)]
pub struct DocumentorResult {
    /// The processed document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl DocumentorResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.document, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get every fragment, in document order.
    pub fn fragments(&self) -> Vec<&Fragment> {
        self.document.fragments().collect()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
