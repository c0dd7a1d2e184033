//! Processing options and configuration.

use crate::error::{Error, Result};
use crate::ocr::BlockOrder;
use std::ops::RangeInclusive;

/// Default minimum length of selectable text before a page skips OCR.
pub const DEFAULT_MIN_TEXT_LEN: usize = 50;

/// Default rasterization resolution.
pub const DEFAULT_DPI: u32 = 200;

/// Options for processing documents.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Page selection (which pages to process)
    pub pages: PageSelection,

    /// Selectable text shorter than this (in characters) sends the page to OCR
    pub min_text_len: usize,

    /// Resolution used when rendering a page for OCR
    pub dpi: u32,

    /// Extract selectable text of all pages in parallel
    pub parallel: bool,

    /// Send every page to OCR regardless of its selectable text
    pub force_ocr: bool,

    /// Order of OCR fragments within a page
    pub block_order: BlockOrder,
}

impl ProcessOptions {
    /// Create new process options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip failing pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable strict mode (first failing page aborts).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set the selectable-text length threshold.
    pub fn with_min_text_len(mut self, len: usize) -> Self {
        self.min_text_len = len;
        self
    }

    /// Set the rasterization resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    /// Enable or disable parallel text extraction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel text extraction.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Force OCR on every page.
    pub fn force_ocr(mut self, force: bool) -> Self {
        self.force_ocr = force;
        self
    }

    /// Set the fragment order for OCR pages.
    pub fn with_block_order(mut self, order: BlockOrder) -> Self {
        self.block_order = order;
        self
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            pages: PageSelection::All,
            min_text_len: DEFAULT_MIN_TEXT_LEN,
            dpi: DEFAULT_DPI,
            parallel: true,
            force_ocr: false,
            block_order: BlockOrder::Detected,
        }
    }
}

/// Error handling mode during processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first page error
    Strict,
    /// Log failing pages and continue
    #[default]
    Lenient,
}

/// Page selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let (start, end) = parse_bounds(s, start, end)?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let (start, end) = parse_bounds(part, start, end)?;
                pages.extend(start..=end);
            } else {
                pages.push(parse_page(part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page(s: &str) -> Result<u32> {
    match s.trim().parse::<u32>() {
        Ok(0) => Err(Error::InvalidPageRange("pages are numbered from 1".into())),
        Ok(p) => Ok(p),
        Err(_) => Err(Error::InvalidPageRange(format!("invalid page number '{}'", s.trim()))),
    }
}

fn parse_bounds(part: &str, start: &str, end: &str) -> Result<(u32, u32)> {
    let start = parse_page(start)?;
    let end = parse_page(end)?;
    if start > end {
        return Err(Error::InvalidPageRange(format!("'{}' ends before it starts", part)));
    }
    Ok((start, end))
}
