//! Integration tests for the scan pipeline: detector output parsing through
//! to rendered fragments.

mod common;

use common::{blank_page, RecordingRecognizer};
use documentor::error::Result;
use documentor::ocr::parse_layout_response;
use documentor::render::{to_json, to_markdown, JsonFormat, RenderOptions};
use documentor::{
    BBox, Block, BlockOrder, Document, FragmentKind, LayoutDetector, Metadata, PageResult,
    PageRoute, ScanPipeline,
};
use image::DynamicImage;

/// Detector that answers with a canned model response.
struct CannedDetector(&'static str);

impl LayoutDetector for CannedDetector {
    fn detect(&self, _page: &DynamicImage) -> Result<Vec<Block>> {
        Ok(parse_layout_response(self.0))
    }
}

const RESPONSE: &str = r#"```json
[
  {"bbox": [40, 30, 760, 90], "category": "Page-header"},
  {"bbox": [40, 120, 760, 200], "category": "Title"},
  {"bbox": [40, 240, 760, 520], "category": "Text"},
  {"bbox": [40, 560, 52, 570], "category": "List-item"},
  {"bbox": [40, 600, 760, 980], "category": "Picture"},
  {"bbox": [40, 1000, 900, 1300], "category": "Table"},
  {"bbox": [40, 1400, 760, 1450], "category": "Unknown-thing"}
]
```"#;

fn pipeline(recognizer: RecordingRecognizer) -> ScanPipeline {
    ScanPipeline::new(Box::new(CannedDetector(RESPONSE)), Box::new(recognizer))
}

#[test]
fn test_canned_response_to_fragments() {
    let recognizer = RecordingRecognizer::default();
    let fragments = pipeline(recognizer.clone())
        .process(&blank_page(800, 1100), 5)
        .unwrap();

    let kinds: Vec<_> = fragments.iter().map(|f| f.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            FragmentKind::PageHeader,
            FragmentKind::Title,
            FragmentKind::Paragraph,
            FragmentKind::ListItem,
            FragmentKind::Picture,
            FragmentKind::Table,
        ]
    );

    // Picture blocks are never sent to the recognizer
    assert_eq!(recognizer.sizes.lock().unwrap().len(), 5);
    assert!(fragments.iter().all(|f| f.page() == Some(5)));
    assert_eq!(fragments[4].id(), Some("page_5_block_4"));
}

#[test]
fn test_small_blocks_are_upscaled() {
    let recognizer = RecordingRecognizer::default();
    pipeline(recognizer.clone())
        .process(&blank_page(800, 1100), 1)
        .unwrap();

    let sizes = recognizer.sizes.lock().unwrap();
    // 12x10 list item grows to at least 32 on each side
    let (w, h) = sizes[3];
    assert!(w >= 32 && h >= 32, "got {}x{}", w, h);
    assert!(sizes.iter().all(|&(w, h)| w >= 32 && h >= 32));
}

#[test]
fn test_blocks_clamped_to_page() {
    let fragments = pipeline(RecordingRecognizer::default())
        .process(&blank_page(800, 1100), 1)
        .unwrap();

    // The table extends past the page on both axes
    let table = fragments
        .iter()
        .find(|f| f.kind() == FragmentKind::Table)
        .unwrap();
    assert_eq!(table.value(), "region 760x100");
}

#[test]
fn test_top_down_order_from_shuffled_response() {
    struct Shuffled;

    impl LayoutDetector for Shuffled {
        fn detect(&self, _page: &DynamicImage) -> Result<Vec<Block>> {
            Ok(parse_layout_response(
                "Text|10,500,300,600\nTitle|10,10,300,60\nSection-header|10,200,300,240",
            ))
        }
    }

    let detected = ScanPipeline::new(Box::new(Shuffled), Box::new(RecordingRecognizer::default()));
    let kinds: Vec<_> = detected
        .process(&blank_page(400, 700), 1)
        .unwrap()
        .iter()
        .map(|f| f.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![FragmentKind::Paragraph, FragmentKind::Title, FragmentKind::SectionHeader]
    );

    let top_down = ScanPipeline::new(Box::new(Shuffled), Box::new(RecordingRecognizer::default()))
        .with_order(BlockOrder::TopDown);
    let kinds: Vec<_> = top_down
        .process(&blank_page(400, 700), 1)
        .unwrap()
        .iter()
        .map(|f| f.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![FragmentKind::Title, FragmentKind::SectionHeader, FragmentKind::Paragraph]
    );
}

#[test]
fn test_fragments_render() {
    let fragments = pipeline(RecordingRecognizer::default())
        .process(&blank_page(800, 1100), 1)
        .unwrap();

    let mut doc = Document::new(Metadata::default());
    doc.add_page(PageResult::new(1, PageRoute::Ocr, fragments));

    let markdown = to_markdown(&doc, &RenderOptions::default()).unwrap();
    assert!(markdown.starts_with("# region 720x80"));
    assert!(!markdown.contains("region 720x60"));
    assert!(markdown.contains("<!-- picture -->"));

    let json: serde_json::Value =
        serde_json::from_str(&to_json(&doc, JsonFormat::Compact).unwrap()).unwrap();
    let first = &json["pages"][0]["fragments"][0];
    assert_eq!(first["kind"], "page_header");
    assert_eq!(first["bbox"], serde_json::json!([40, 30, 760, 90]));
    assert_eq!(first["source"], "text_recognizer");
}

#[test]
fn test_bbox_helpers() {
    let bbox = BBox::new(760, 90, 40, 30);
    assert_eq!(bbox, BBox::new(40, 30, 760, 90));
    assert_eq!(bbox.width(), 720);
    assert_eq!(bbox.clamp_to(500, 50), BBox::new(40, 30, 500, 50));
}
