//! Shared fixtures: in-memory PDFs and mock pipeline stages.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use documentor::error::{Error, Result};
use documentor::{
    BBox, Block, LayoutCategory, LayoutDetector, PageRasterizer, PdfProcessor, ProcessOptions,
    ScanPipeline, TextRecognizer,
};
use image::{DynamicImage, GenericImageView, RgbImage};
use lopdf::{dictionary, Document as LopdfDocument, Object, Stream, StringFormat};

/// Build a PDF with one Helvetica text line per page; empty strings give
/// pages without any text.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = LopdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text)
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(b"Field Survey".to_vec(), StringFormat::Literal),
        "Author" => Object::String(b"Survey Team".to_vec(), StringFormat::Literal),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Write `build_pdf(pages)` to `dir/name`.
pub fn write_pdf(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).unwrap();
    path
}

/// A page of body text long enough to skip OCR at the default threshold.
pub fn long_text(label: &str) -> String {
    format!("{} contains enough selectable text to be used without any OCR at all", label)
}

/// White page image.
pub fn blank_page(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255])))
}

/// Detector that returns the same blocks for every page.
pub struct FixedDetector {
    blocks: Vec<Block>,
}

impl FixedDetector {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Title, text and picture blocks on a 1000x1400 page.
    pub fn standard() -> Self {
        Self::new(vec![
            Block::new(BBox::new(100, 50, 900, 120), LayoutCategory::Title, 0).with_confidence(0.98),
            Block::new(BBox::new(100, 200, 900, 600), LayoutCategory::Text, 1).with_confidence(0.95),
            Block::new(BBox::new(100, 700, 900, 1200), LayoutCategory::Picture, 2)
                .with_confidence(0.9),
        ])
    }
}

impl LayoutDetector for FixedDetector {
    fn detect(&self, _page: &DynamicImage) -> Result<Vec<Block>> {
        Ok(self.blocks.clone())
    }
}

/// Detector that always fails.
pub struct FailingDetector;

impl LayoutDetector for FailingDetector {
    fn detect(&self, _page: &DynamicImage) -> Result<Vec<Block>> {
        Err(Error::InvalidResponse("layout server unavailable".into()))
    }
}

/// Recognizer that reports the size of every region it receives.
#[derive(Clone, Default)]
pub struct RecordingRecognizer {
    pub sizes: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl TextRecognizer for RecordingRecognizer {
    fn recognize(&self, region: &DynamicImage) -> Result<String> {
        let (w, h) = region.dimensions();
        self.sizes.lock().unwrap().push((w, h));
        Ok(format!("region {}x{}", w, h))
    }
}

/// Rasterizer that records the pages it renders and returns blank pages.
#[derive(Clone)]
pub struct RecordingRasterizer {
    pub calls: Arc<Mutex<Vec<(u32, u32)>>>,
    fail_on: Option<u32>,
}

impl RecordingRasterizer {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    /// Fail when asked to render `page`.
    pub fn failing_on(page: u32) -> Self {
        Self {
            fail_on: Some(page),
            ..Self::new()
        }
    }

    pub fn pages(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|&(page, _)| page).collect()
    }
}

impl PageRasterizer for RecordingRasterizer {
    fn rasterize(&self, _pdf: &Path, page: u32, dpi: u32) -> Result<DynamicImage> {
        self.calls.lock().unwrap().push((page, dpi));
        if self.fail_on == Some(page) {
            return Err(Error::Rasterize(format!("cannot render page {}", page)));
        }
        Ok(blank_page(1000, 1400))
    }
}

/// Processor with the standard mock detector, a recording recognizer and
/// the given rasterizer.
pub fn mock_processor(rasterizer: RecordingRasterizer, options: ProcessOptions) -> PdfProcessor {
    let pipeline = ScanPipeline::new(
        Box::new(FixedDetector::standard()),
        Box::new(RecordingRecognizer::default()),
    );
    PdfProcessor::new(pipeline, Box::new(rasterizer), options).unwrap()
}
