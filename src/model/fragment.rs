//! Fragment types: the unit of structured output.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page pixel coordinates, `(x1, y1)` top-left
/// and `(x2, y2)` bottom-right.
///
/// Serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct BBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BBox {
    /// Create a bounding box; corners given in the wrong order are swapped.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// True when the box covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Clamp the box to an image of the given size.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        Self::new(
            self.x1.min(width),
            self.y1.min(height),
            self.x2.min(width),
            self.y2.min(height),
        )
    }

    /// Scale every coordinate by `factor`, rounding to the nearest pixel.
    pub fn scale(&self, factor: f64) -> Self {
        let s = |v: u32| (f64::from(v) * factor).round().max(0.0) as u32;
        Self::new(s(self.x1), s(self.y1), s(self.x2), s(self.y2))
    }
}

impl From<[u32; 4]> for BBox {
    fn from(c: [u32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<BBox> for [u32; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// Semantic type of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Paragraph,
    Title,
    SectionHeader,
    Caption,
    Footnote,
    ListItem,
    PageHeader,
    PageFooter,
    Table,
    Formula,
    Picture,
}

impl FragmentKind {
    /// Short human-readable description of the kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Paragraph => "Paragraph of body text",
            Self::Title => "Document title",
            Self::SectionHeader => "Section or subsection heading",
            Self::Caption => "Short descriptive text accompanying figures, tables, or formulas",
            Self::Footnote => "Supplementary information or citations at the bottom of pages",
            Self::ListItem => "Individual items in bulleted, numbered, or definition lists",
            Self::PageHeader => "Repeating header information at the top of pages",
            Self::PageFooter => "Repeating footer information at the bottom of pages",
            Self::Table => "Tabular content",
            Self::Formula => "Mathematical formula in LaTeX",
            Self::Picture => "Picture, chart or diagram",
        }
    }

    /// Whether fragments of this kind carry recognized text.
    pub fn is_textual(&self) -> bool {
        !matches!(self, Self::Picture)
    }

    /// Running headers and footers that repeat on every page.
    pub fn is_page_furniture(&self) -> bool {
        matches!(self, Self::PageHeader | Self::PageFooter)
    }
}

/// Where a fragment's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentSource {
    /// Text embedded in the PDF content stream
    SelectableText,
    /// Layout detector only (pictures are never transcribed)
    LayoutDetector,
    /// Region transcribed by the text recognizer
    TextRecognizer,
    /// Line of a plain-text file
    PlainText,
}

/// One piece of extracted document content.
///
/// Fragments are built once with the `with_*` methods and are read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    kind: FragmentKind,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    bbox: Option<BBox>,
    confidence: f32,
    source: FragmentSource,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    id: Option<String>,
}

impl Fragment {
    /// Create a fragment with full confidence and no position.
    pub fn new(kind: FragmentKind, value: impl Into<String>, source: FragmentSource) -> Self {
        Self {
            kind,
            value: value.into(),
            bbox: None,
            confidence: 1.0,
            source,
            page: None,
            id: None,
        }
    }

    /// Create a paragraph fragment.
    pub fn paragraph(value: impl Into<String>, source: FragmentSource) -> Self {
        Self::new(FragmentKind::Paragraph, value, source)
    }

    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Set the confidence, clamped to `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.bbox
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn source(&self) -> FragmentSource {
        self.source
    }

    /// Page number (1-indexed), if known.
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Check if the fragment has no text.
    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_normalizes_corners() {
        let b = BBox::new(50, 80, 10, 20);
        assert_eq!(b, BBox::new(10, 20, 50, 80));
        assert_eq!(b.width(), 40);
        assert_eq!(b.height(), 60);
        assert_eq!(b.area(), 2400);
    }

    #[test]
    fn test_bbox_clamp_and_scale() {
        let b = BBox::new(100, 100, 900, 1200);
        let clamped = b.clamp_to(800, 1000);
        assert_eq!(clamped, BBox::new(100, 100, 800, 1000));

        let outside = BBox::new(900, 900, 950, 950).clamp_to(800, 800);
        assert!(outside.is_empty());

        assert_eq!(BBox::new(10, 20, 30, 40).scale(2.0), BBox::new(20, 40, 60, 80));
    }

    #[test]
    fn test_bbox_serializes_as_array() {
        let json = serde_json::to_string(&BBox::new(1, 2, 3, 4)).unwrap();
        assert_eq!(json, "[1,2,3,4]");
        let back: BBox = serde_json::from_str("[3,4,1,2]").unwrap();
        assert_eq!(back, BBox::new(1, 2, 3, 4));
    }

    #[test]
    fn test_fragment_builder() {
        let f = Fragment::new(FragmentKind::Caption, "Figure 1", FragmentSource::TextRecognizer)
            .with_bbox(BBox::new(0, 0, 10, 10))
            .with_confidence(1.7)
            .on_page(3)
            .with_id("page_3_block_0");

        assert_eq!(f.kind(), FragmentKind::Caption);
        assert_eq!(f.value(), "Figure 1");
        assert_eq!(f.confidence(), 1.0);
        assert_eq!(f.page(), Some(3));
        assert_eq!(f.id(), Some("page_3_block_0"));
        assert_eq!(f.to_string(), "Figure 1");
    }

    #[test]
    fn test_fragment_json_shape() {
        let f = Fragment::paragraph("Hello", FragmentSource::SelectableText);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], "paragraph");
        assert_eq!(json["source"], "selectable_text");
        assert!(json.get("bbox").is_none());
    }

    #[test]
    fn test_kind_flags() {
        assert!(!FragmentKind::Picture.is_textual());
        assert!(FragmentKind::Formula.is_textual());
        assert!(FragmentKind::PageFooter.is_page_furniture());
        assert!(!FragmentKind::Title.is_page_furniture());
    }
}
