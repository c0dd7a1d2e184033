//! Two-stage scan pipeline: layout detection, then per-block recognition.

use super::image::{crop_block, ensure_min_size};
use super::layout::{LayoutDetector, RemoteLayoutDetector};
use super::recognizer::{RemoteTextRecognizer, TextRecognizer};
use crate::config::OcrConfig;
use crate::error::Result;
use crate::model::{Block, Fragment, FragmentKind, FragmentSource, LayoutCategory};
use image::DynamicImage;

/// Order of the fragments produced for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockOrder {
    /// Keep the detector's order (the model is asked for reading order)
    #[default]
    Detected,
    /// Sort top to bottom, then left to right
    TopDown,
}

/// Turns a page image into fragments using a detector and a recognizer.
pub struct ScanPipeline {
    detector: Box<dyn LayoutDetector>,
    recognizer: Box<dyn TextRecognizer>,
    min_block_size: u32,
    order: BlockOrder,
}

impl ScanPipeline {
    pub fn new(detector: Box<dyn LayoutDetector>, recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            detector,
            recognizer,
            min_block_size: 32,
            order: BlockOrder::Detected,
        }
    }

    /// Build a pipeline talking to the two configured model servers.
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        let detector = RemoteLayoutDetector::new(config.layout.clone())?
            .with_max_image_size(config.max_image_size)
            .with_min_confidence(config.min_confidence);
        let recognizer = RemoteTextRecognizer::new(config.recognizer.clone())?
            .with_max_image_size(config.max_image_size);

        Ok(Self::new(Box::new(detector), Box::new(recognizer))
            .with_min_block_size(config.min_block_size))
    }

    /// Set the side below which crops are upscaled before recognition.
    pub fn with_min_block_size(mut self, size: u32) -> Self {
        self.min_block_size = size;
        self
    }

    /// Set the order in which blocks become fragments.
    pub fn with_order(mut self, order: BlockOrder) -> Self {
        self.order = order;
        self
    }

    pub fn order(&self) -> BlockOrder {
        self.order
    }

    /// Process one page image (page numbers are 1-indexed).
    ///
    /// A detector failure fails the page. A block whose recognition fails or
    /// yields no text is skipped.
    pub fn process(&self, page: &DynamicImage, page_number: u32) -> Result<Vec<Fragment>> {
        let mut blocks = self.detector.detect(page)?;
        if self.order == BlockOrder::TopDown {
            blocks.sort_by_key(|b| (b.bbox.y1, b.bbox.x1, b.order));
        }
        log::info!("Page {}: {} blocks detected", page_number, blocks.len());

        let fragments: Vec<Fragment> = blocks
            .iter()
            .filter_map(|block| self.process_block(page, block, page_number))
            .collect();

        log::debug!(
            "Page {}: {} of {} blocks produced fragments",
            page_number,
            fragments.len(),
            blocks.len()
        );
        Ok(fragments)
    }

    fn process_block(&self, page: &DynamicImage, block: &Block, page_number: u32) -> Option<Fragment> {
        let id = format!("page_{}_block_{}", page_number, block.order);

        if block.category == LayoutCategory::Picture {
            return Some(
                Fragment::new(FragmentKind::Picture, "", FragmentSource::LayoutDetector)
                    .with_bbox(block.bbox)
                    .with_confidence(block.confidence)
                    .on_page(page_number)
                    .with_id(id),
            );
        }

        let Some(region) = crop_block(page, block.bbox) else {
            log::warn!(
                "Page {}: skipping {} block {} with empty region {:?}",
                page_number,
                block.category,
                block.order,
                block.bbox
            );
            return None;
        };
        let region = ensure_min_size(region, self.min_block_size);

        let text = match self.recognizer.recognize(&region) {
            Ok(text) => text,
            Err(e) => {
                log::warn!(
                    "Page {}: recognition failed for {} block {}: {}",
                    page_number,
                    block.category,
                    block.order,
                    e
                );
                return None;
            }
        };

        let text = text.trim();
        if text.is_empty() {
            log::debug!(
                "Page {}: no text in {} block {}",
                page_number,
                block.category,
                block.order
            );
            return None;
        }

        Some(
            Fragment::new(block.category.fragment_kind(), text, FragmentSource::TextRecognizer)
                .with_bbox(block.bbox)
                .with_confidence(block.confidence)
                .on_page(page_number)
                .with_id(id),
        )
    }
}
