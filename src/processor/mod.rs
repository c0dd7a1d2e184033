//! Hybrid page router.
//!
//! Every PDF page first offers its selectable text. Pages whose text is long
//! enough become paragraph fragments directly; all other pages are rendered
//! and sent through the [`ScanPipeline`].

mod cleanup;

pub use cleanup::TextCleanup;

use crate::config::OcrConfig;
use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{
    Document, Fragment, FragmentSource, Metadata, PageResult, PageRoute, ProcessingMethod,
};
use crate::ocr::ScanPipeline;
use crate::parser::{ErrorMode, PageSelection, PdfParser, ProcessOptions};
use crate::raster::{PageRasterizer, PdftoppmRasterizer};
use image::{DynamicImage, GenericImageView};
use rayon::prelude::*;
use std::path::Path;

/// Below this many pages selectable text is extracted sequentially.
const PARALLEL_MIN_PAGES: usize = 8;

/// Routes PDF pages between selectable text and OCR.
pub struct PdfProcessor {
    pipeline: ScanPipeline,
    rasterizer: Box<dyn PageRasterizer>,
    options: ProcessOptions,
    cleanup: TextCleanup,
}

impl PdfProcessor {
    /// Create a processor from its parts; the pipeline adopts
    /// `options.block_order`.
    pub fn new(
        pipeline: ScanPipeline,
        rasterizer: Box<dyn PageRasterizer>,
        options: ProcessOptions,
    ) -> Result<Self> {
        Ok(Self {
            pipeline: pipeline.with_order(options.block_order),
            rasterizer,
            options,
            cleanup: TextCleanup::new()?,
        })
    }

    /// Create a processor that talks to the configured model servers and
    /// renders pages with `pdftoppm`.
    pub fn from_config(config: &OcrConfig, options: ProcessOptions) -> Result<Self> {
        Self::new(
            ScanPipeline::from_config(config)?,
            Box::new(PdftoppmRasterizer::new()),
            options,
        )
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Cleaned selectable text of a page, `None` when there is none.
    pub fn selectable_text(&self, parser: &PdfParser, page: u32) -> Option<String> {
        cleaned_text(&self.cleanup, parser, page)
    }

    /// Decide how a page with the given selectable text is processed.
    pub fn route(&self, text: Option<&str>) -> PageRoute {
        route_for(text, &self.options)
    }

    /// Process every selected page of a PDF file.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        detect_format_from_bytes(&bytes)?;
        let parser = PdfParser::from_bytes(&bytes)?;

        let mut metadata = parser.metadata();
        let file = Metadata::from_path(path, ProcessingMethod::PdfProcessing);
        metadata.name = file.name;
        metadata.extension = file.extension;
        metadata.file_path = file.file_path;
        metadata.file_size = Some(bytes.len() as u64);

        let pages = self.select_pages(&parser)?;
        log::info!(
            "Processing {}: {} of {} pages selected",
            path.display(),
            pages.len(),
            metadata.page_count
        );

        let texts = self.extract_texts(&bytes, &parser, &pages)?;
        let mut document = Document::new(metadata);

        for (page, text) in pages.into_iter().zip(texts) {
            match self.process_page(path, page, text) {
                Ok(result) => document.add_page(result),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page, e);
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Finished {}: {} fragments ({} pages from selectable text, {} via OCR)",
            path.display(),
            document.fragment_count(),
            document.count_route(PageRoute::SelectableText),
            document.count_route(PageRoute::Ocr)
        );
        Ok(document)
    }

    /// Process one page given its (already extracted) selectable text.
    pub fn process_page(&self, pdf: &Path, page: u32, text: Option<String>) -> Result<PageResult> {
        match (self.route(text.as_deref()), text) {
            (PageRoute::SelectableText, Some(text)) => {
                log::info!("Page {}: using selectable text ({} chars)", page, text.chars().count());
                Ok(PageResult::new(
                    page,
                    PageRoute::SelectableText,
                    text_fragments(&text, page),
                ))
            }
            (_, text) => {
                log::info!(
                    "Page {}: running OCR ({} chars of selectable text)",
                    page,
                    text.map(|t| t.chars().count()).unwrap_or(0)
                );
                let image = self.rasterizer.rasterize(pdf, page, self.options.dpi)?;
                let fragments = self.pipeline.process(&image, page)?;
                Ok(PageResult::new(page, PageRoute::Ocr, fragments))
            }
        }
    }

    /// Run the scan pipeline on a single page image.
    pub fn process_image(&self, image: &DynamicImage) -> Result<Vec<Fragment>> {
        self.pipeline.process(image, 1)
    }

    /// Load an image file and run the scan pipeline on it.
    pub fn process_image_file<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();
        let image = image::open(path)?;
        let (width, height) = image.dimensions();

        let mut metadata = Metadata::from_path(path, ProcessingMethod::Ocr);
        metadata.page_count = 1;
        metadata.image_width = Some(width);
        metadata.image_height = Some(height);

        log::info!("Processing image {} ({}x{})", path.display(), width, height);
        let fragments = self.process_image(&image)?;

        let mut document = Document::new(metadata);
        document.add_page(PageResult::new(1, PageRoute::Ocr, fragments));
        Ok(document)
    }

    fn select_pages(&self, parser: &PdfParser) -> Result<Vec<u32>> {
        let total = parser.page_count();
        if let PageSelection::Pages(requested) = &self.options.pages {
            if let Some(&missing) = requested.iter().find(|&&p| p > total) {
                if self.options.error_mode == ErrorMode::Strict {
                    return Err(Error::PageOutOfRange(missing, total));
                }
                log::warn!("Page {} is out of range (document has {} pages)", missing, total);
            }
        }

        Ok(parser
            .page_numbers()
            .into_iter()
            .filter(|&p| self.options.pages.includes(p))
            .collect())
    }

    /// Selectable text for each page in `pages`, in the same order.
    ///
    /// In parallel mode each rayon worker parses its own copy of the document.
    fn extract_texts(&self, bytes: &[u8], parser: &PdfParser, pages: &[u32]) -> Result<Vec<Option<String>>> {
        if self.options.force_ocr {
            return Ok(vec![None; pages.len()]);
        }

        let threads = rayon::current_num_threads();
        if !self.options.parallel || pages.len() < PARALLEL_MIN_PAGES || threads < 2 {
            return Ok(pages.iter().map(|&p| self.selectable_text(parser, p)).collect());
        }

        let chunk_size = pages.len().div_ceil(threads);
        let chunks = pages
            .par_chunks(chunk_size)
            .map(|chunk| -> Result<Vec<Option<String>>> {
                let local = PdfParser::from_bytes(bytes)?;
                Ok(chunk
                    .iter()
                    .map(|&p| self.selectable_text(&local, p))
                    .collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(chunks.into_iter().flatten().collect())
    }
}

/// Route a page takes given its cleaned selectable text.
pub fn route_for(text: Option<&str>, options: &ProcessOptions) -> PageRoute {
    match text {
        Some(t) if !options.force_ocr && t.chars().count() >= options.min_text_len => {
            PageRoute::SelectableText
        }
        _ => PageRoute::Ocr,
    }
}

fn cleaned_text(cleanup: &TextCleanup, parser: &PdfParser, page: u32) -> Option<String> {
    let raw = parser.selectable_text(page)?;
    let text = cleanup.process(&raw);
    (!text.is_empty()).then_some(text)
}

/// Predicted handling of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePrediction {
    pub page: u32,
    /// Characters of cleaned selectable text
    pub chars: usize,
    pub route: PageRoute,
}

/// Predict the route of every selected page without rendering anything or
/// contacting a model server.
///
/// Text goes through the same cleanup as [`PdfProcessor::process_file`], so
/// the prediction matches what processing will do.
pub fn predict_routes(parser: &PdfParser, options: &ProcessOptions) -> Result<Vec<RoutePrediction>> {
    let cleanup = TextCleanup::new()?;
    Ok(parser
        .page_numbers()
        .into_iter()
        .filter(|&p| options.pages.includes(p))
        .map(|page| {
            let text = cleaned_text(&cleanup, parser, page);
            RoutePrediction {
                page,
                chars: text.as_ref().map_or(0, |t| t.chars().count()),
                route: route_for(text.as_deref(), options),
            }
        })
        .collect())
}

/// Split selectable text into paragraph fragments on blank lines.
///
/// Ids number paragraphs from 1 in split order; blank paragraphs are dropped
/// but keep their number.
pub fn text_fragments(text: &str, page: u32) -> Vec<Fragment> {
    text.split("\n\n")
        .enumerate()
        .filter_map(|(i, paragraph)| {
            let paragraph = paragraph.trim();
            (!paragraph.is_empty()).then(|| {
                Fragment::paragraph(paragraph, FragmentSource::SelectableText)
                    .on_page(page)
                    .with_id(format!("page_{}_para_{}", page, i + 1))
            })
        })
        .collect()
}
