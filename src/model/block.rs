//! Layout blocks produced by the layout detector.

use super::{BBox, FragmentKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Category labels understood by the layout detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutCategory {
    Caption,
    Footnote,
    Formula,
    ListItem,
    PageFooter,
    PageHeader,
    Picture,
    SectionHeader,
    Table,
    Text,
    Title,
}

impl LayoutCategory {
    /// Every category, in the order the detector prompt lists them.
    pub const ALL: [LayoutCategory; 11] = [
        Self::Caption,
        Self::Footnote,
        Self::Formula,
        Self::ListItem,
        Self::PageFooter,
        Self::PageHeader,
        Self::Picture,
        Self::SectionHeader,
        Self::Table,
        Self::Text,
        Self::Title,
    ];

    /// Label as it appears in detector output (e.g. `List-item`).
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Caption => "Caption",
            Self::Footnote => "Footnote",
            Self::Formula => "Formula",
            Self::ListItem => "List-item",
            Self::PageFooter => "Page-footer",
            Self::PageHeader => "Page-header",
            Self::Picture => "Picture",
            Self::SectionHeader => "Section-header",
            Self::Table => "Table",
            Self::Text => "Text",
            Self::Title => "Title",
        }
    }

    /// Fragment kind a block of this category turns into.
    pub const fn fragment_kind(&self) -> FragmentKind {
        match self {
            Self::Caption => FragmentKind::Caption,
            Self::Footnote => FragmentKind::Footnote,
            Self::Formula => FragmentKind::Formula,
            Self::ListItem => FragmentKind::ListItem,
            Self::PageFooter => FragmentKind::PageFooter,
            Self::PageHeader => FragmentKind::PageHeader,
            Self::Picture => FragmentKind::Picture,
            Self::SectionHeader => FragmentKind::SectionHeader,
            Self::Table => FragmentKind::Table,
            Self::Text => FragmentKind::Paragraph,
            Self::Title => FragmentKind::Title,
        }
    }

    /// Whether blocks of this category are sent to the text recognizer.
    pub const fn needs_recognition(&self) -> bool {
        !matches!(self, Self::Picture)
    }
}

impl std::fmt::Display for LayoutCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LayoutCategory {
    type Err = String;

    /// Case-insensitive; `-`, `_` and spaces are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        Self::ALL
            .iter()
            .find(|c| c.label().replace('-', "").to_lowercase() == key)
            .copied()
            .ok_or_else(|| format!("unknown layout category '{s}'"))
    }
}

/// A region found by the layout detector.
///
/// Blocks live only between the detection and recognition stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Region in page pixel coordinates
    pub bbox: BBox,

    /// Detected category
    pub category: LayoutCategory,

    /// Detector confidence in `[0, 1]`
    pub confidence: f32,

    /// Position in detector output order
    pub order: usize,
}

impl Block {
    pub fn new(bbox: BBox, category: LayoutCategory, order: usize) -> Self {
        Self {
            bbox,
            category,
            confidence: 1.0,
            order,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}
