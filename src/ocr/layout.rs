//! Layout detection: page image in, categorized regions out.

use super::client::{strip_code_fence, ChatClient};
use super::image::{fit_within, to_data_url};
use super::prompts::{layout_system_prompt, LAYOUT_PROMPT};
use crate::config::ApiConfig;
use crate::error::Result;
use crate::model::{BBox, Block, LayoutCategory};
use image::{DynamicImage, GenericImageView};
use serde_json::Value;

/// Finds regions on a page image.
pub trait LayoutDetector: Send + Sync {
    /// Detect blocks; bounding boxes are in pixel coordinates of `page`.
    fn detect(&self, page: &DynamicImage) -> Result<Vec<Block>>;
}

/// Layout detector backed by a remote vision-language model.
pub struct RemoteLayoutDetector {
    client: ChatClient,
    max_image_size: u32,
    min_confidence: f32,
}

impl RemoteLayoutDetector {
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(config)?,
            max_image_size: 2048,
            min_confidence: 0.5,
        })
    }

    /// Set the longest side of the page image sent to the model.
    pub fn with_max_image_size(mut self, size: u32) -> Self {
        self.max_image_size = size;
        self
    }

    /// Set the confidence below which detected blocks are dropped.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_confidence = confidence;
        self
    }
}

impl LayoutDetector for RemoteLayoutDetector {
    fn detect(&self, page: &DynamicImage) -> Result<Vec<Block>> {
        let (width, height) = page.dimensions();
        let (resized, scale) = fit_within(page, self.max_image_size);
        let (sent_width, sent_height) = resized.dimensions();

        let content = self.client.complete(
            &layout_system_prompt(sent_width, sent_height),
            LAYOUT_PROMPT,
            &to_data_url(&resized)?,
        )?;

        let detected = parse_layout_response(&content);
        let total = detected.len();
        let blocks = finalize_blocks(detected, scale, width, height, self.min_confidence);

        log::debug!(
            "Layout detector returned {} blocks, kept {} (min confidence {})",
            total,
            blocks.len(),
            self.min_confidence
        );
        Ok(blocks)
    }
}

/// Drop blocks below `min_confidence`, map the rest from the resized image
/// back to page pixels with `scale` and clamp them to `width` x `height`.
pub fn finalize_blocks(
    blocks: Vec<Block>,
    scale: f64,
    width: u32,
    height: u32,
    min_confidence: f32,
) -> Vec<Block> {
    blocks
        .into_iter()
        .filter(|b| b.confidence >= min_confidence)
        .map(|mut b| {
            b.bbox = b.bbox.scale(scale).clamp_to(width, height);
            b
        })
        .collect()
}

/// Parse a layout response into blocks.
///
/// Accepts a JSON array of elements, an object with an `elements` array, or
/// a single element object; a surrounding code fence is ignored. Elements
/// without a 4-number `bbox` or a known `category` are skipped. When the
/// response is not JSON at all, lines of the form `Category|x1,y1,x2,y2`
/// are read instead.
pub fn parse_layout_response(content: &str) -> Vec<Block> {
    let body = strip_code_fence(content);
    match serde_json::from_str::<Value>(body) {
        Ok(value) => parse_json_elements(value),
        Err(_) => parse_line_elements(body),
    }
}

fn parse_json_elements(value: Value) -> Vec<Block> {
    let elements = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("elements") {
            Some(Value::Array(items)) => items,
            Some(_) => Vec::new(),
            None => vec![Value::Object(map)],
        },
        _ => Vec::new(),
    };

    elements
        .iter()
        .filter_map(parse_json_element)
        .enumerate()
        .map(|(order, (bbox, category, confidence))| {
            Block::new(bbox, category, order).with_confidence(confidence)
        })
        .collect()
}

fn parse_json_element(element: &Value) -> Option<(BBox, LayoutCategory, f32)> {
    let category: LayoutCategory = element.get("category")?.as_str()?.parse().ok()?;

    let coords = element.get("bbox")?.as_array()?;
    if coords.len() != 4 {
        return None;
    }
    let mut c = [0u32; 4];
    for (slot, v) in c.iter_mut().zip(coords) {
        *slot = coordinate(v)?;
    }

    let confidence = element
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(1.0) as f32;

    Some((BBox::from(c), category, confidence))
}

/// A pixel coordinate; fractional values are truncated, negatives become 0.
fn coordinate(v: &Value) -> Option<u32> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then(|| n.max(0.0) as u32)
}

fn parse_line_elements(content: &str) -> Vec<Block> {
    content
        .lines()
        .filter_map(|line| {
            let (label, coords) = line.trim().split_once('|')?;
            if coords.contains('|') {
                return None;
            }
            let category: LayoutCategory = label.trim().parse().ok()?;
            let values: Vec<u32> = coords
                .split(',')
                .map(|c| c.trim().parse::<u32>().ok())
                .collect::<Option<_>>()?;
            let [x1, y1, x2, y2] = <[u32; 4]>::try_from(values).ok()?;
            Some((BBox::new(x1, y1, x2, y2), category))
        })
        .enumerate()
        .map(|(order, (bbox, category))| Block::new(bbox, category, order))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::test_server::{request_json, serve_once};

    #[test]
    fn test_parse_json_array() {
        let blocks = parse_layout_response(
            r#"[
                {"bbox": [10, 20, 300, 60], "category": "Title"},
                {"bbox": [10, 80, 300, 400], "category": "Text", "confidence": 0.8}
            ]"#,
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].category, LayoutCategory::Title);
        assert_eq!(blocks[0].confidence, 1.0);
        assert_eq!(blocks[1].bbox, BBox::new(10, 80, 300, 400));
        assert_eq!(blocks[1].order, 1);
        assert!((blocks[1].confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_parse_elements_object_and_single_object() {
        let blocks = parse_layout_response(
            r#"{"elements": [{"bbox": [0, 0, 5, 5], "category": "Picture"}]}"#,
        );
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].category, LayoutCategory::Picture);

        let single = parse_layout_response(r#"{"bbox": [1, 2, 3, 4], "category": "Formula"}"#);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].category, LayoutCategory::Formula);
    }

    #[test]
    fn test_parse_skips_invalid_elements() {
        let blocks = parse_layout_response(
            r#"```json
            [
                {"bbox": [0, 0, 10], "category": "Text"},
                {"bbox": [0, 0, 10, 10], "category": "Checkbox"},
                {"category": "Text"},
                "noise",
                {"bbox": [0.9, "4", 10.5, 12], "category": "Section-header"}
            ]
            ```"#,
        );
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].category, LayoutCategory::SectionHeader);
        assert_eq!(blocks[0].bbox, BBox::new(0, 4, 10, 12));
        assert_eq!(blocks[0].order, 0);
    }

    #[test]
    fn test_parse_line_fallback() {
        let blocks = parse_layout_response(
            "Here is the layout:\nTitle|10,10,200,40\nText|10,50,200,300\nBogus|1,2,3,4\nText|1,2,3",
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].category, LayoutCategory::Title);
        assert_eq!(blocks[1].bbox, BBox::new(10, 50, 200, 300));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_layout_response("I cannot see a document.").is_empty());
        assert!(parse_layout_response("42").is_empty());
        assert!(parse_layout_response(r#"{"elements": "none"}"#).is_empty());
    }

    #[test]
    fn test_finalize_blocks_rescales_and_clamps() {
        // 4000x2000 page sent at 2048x1024
        let scale = 4000.0 / 2048.0;
        let blocks = vec![
            Block::new(BBox::new(100, 200, 1024, 512), LayoutCategory::Text, 0),
            Block::new(BBox::new(1900, 900, 2100, 1100), LayoutCategory::Picture, 1),
            Block::new(BBox::new(0, 0, 10, 10), LayoutCategory::Footnote, 2).with_confidence(0.3),
        ];

        let kept = finalize_blocks(blocks, scale, 4000, 2000, 0.5);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].bbox, BBox::new(195, 391, 2000, 1000));
        assert_eq!(kept[1].bbox, BBox::new(3711, 1758, 4000, 2000));
        assert_eq!(kept[1].order, 1);
    }

    #[test]
    fn test_finalize_blocks_keeps_threshold_confidence() {
        let blocks = vec![
            Block::new(BBox::new(0, 0, 5, 5), LayoutCategory::Text, 0).with_confidence(0.5),
            Block::new(BBox::new(0, 0, 5, 5), LayoutCategory::Text, 1).with_confidence(0.49),
        ];
        let kept = finalize_blocks(blocks, 1.0, 100, 100, 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].order, 0);
    }

    #[test]
    fn test_remote_detect_maps_to_page_pixels() {
        let content = serde_json::json!([
            {"bbox": [10, 20, 250, 240], "category": "Title"},
            {"bbox": [400, 200, 520, 260], "category": "Text", "confidence": 0.9},
            {"bbox": [0, 0, 50, 50], "category": "Text", "confidence": 0.2}
        ])
        .to_string();
        let body = serde_json::json!({"choices": [{"message": {"content": content}}]}).to_string();
        let (base_url, server) = serve_once("200 OK", body);

        let detector = RemoteLayoutDetector::new(ApiConfig::new(base_url, "layout-key"))
            .unwrap()
            .with_max_image_size(500);
        let blocks = detector.detect(&DynamicImage::new_rgb8(1000, 500)).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].category, LayoutCategory::Title);
        assert_eq!(blocks[0].bbox, BBox::new(20, 40, 500, 480));
        assert_eq!(blocks[1].bbox, BBox::new(800, 400, 1000, 500));

        let request = request_json(&server.join().unwrap());
        let system = request["messages"][0]["content"].as_str().unwrap();
        assert!(system.contains("500x250 pixels"), "system prompt: {}", system);
        assert_eq!(request["messages"][1]["content"][1]["text"], LAYOUT_PROMPT);
    }
}
