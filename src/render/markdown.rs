//! Markdown rendering for processed documents.

use crate::error::Result;
use crate::model::{Document, Fragment, FragmentKind, PageResult};

use super::RenderOptions;

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
///
/// Each fragment kind maps to one Markdown construct; OCR tables and
/// formulas are already Markdown/LaTeX and pass through unchanged.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(&self, doc: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
            output.push('\n');
        }

        for page in &doc.pages {
            self.render_page(&mut output, page);
        }

        Ok(output.trim().to_string())
    }

    fn render_page(&self, output: &mut String, page: &PageResult) {
        if self.options.page_markers {
            output.push_str(&format!("<!-- page {} -->\n\n", page.number));
        }
        for fragment in &page.fragments {
            self.render_fragment(output, fragment);
        }
    }

    fn render_fragment(&self, output: &mut String, fragment: &Fragment) {
        let kind = fragment.kind();
        if kind.is_page_furniture() && !self.options.include_page_furniture {
            return;
        }

        let value = fragment.value().trim();
        if kind == FragmentKind::Picture {
            output.push_str(&self.options.picture_placeholder);
            output.push_str("\n\n");
            return;
        }
        if value.is_empty() {
            return;
        }

        match kind {
            FragmentKind::Title => {
                output.push_str("# ");
                output.push_str(&self.inline(value));
            }
            FragmentKind::SectionHeader => {
                output.push_str("## ");
                output.push_str(&self.inline(value));
            }
            FragmentKind::ListItem => {
                output.push_str("- ");
                output.push_str(&self.inline(strip_bullet(value)));
            }
            FragmentKind::Formula => {
                if value.starts_with("$$") {
                    output.push_str(value);
                } else {
                    output.push_str(&format!("$$\n{}\n$$", value.trim_matches('$').trim()));
                }
            }
            FragmentKind::Caption => output.push_str(&format!("*{}*", self.inline(value))),
            FragmentKind::Table => output.push_str(value),
            FragmentKind::Footnote
            | FragmentKind::Paragraph
            | FragmentKind::PageHeader
            | FragmentKind::PageFooter
            | FragmentKind::Picture => output.push_str(&self.escape(value)),
        }
        output.push_str("\n\n");
    }

    /// Single-line text for headings, list items and captions.
    fn inline(&self, text: &str) -> String {
        self.escape(&text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Drop a bullet the recognizer already transcribed.
fn strip_bullet(text: &str) -> &str {
    for marker in ["- ", "* ", "• ", "· "] {
        if let Some(rest) = text.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    text
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FragmentSource, Metadata, PageRoute};

    fn doc_with(fragments: Vec<Fragment>) -> Document {
        let mut doc = Document::new(Metadata::default());
        doc.add_page(PageResult::new(1, PageRoute::Ocr, fragments));
        doc
    }

    fn fragment(kind: FragmentKind, value: &str) -> Fragment {
        Fragment::new(kind, value, FragmentSource::TextRecognizer)
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
    }

    #[test]
    fn test_render_kinds() {
        let doc = doc_with(vec![
            fragment(FragmentKind::Title, "Annual Report"),
            fragment(FragmentKind::SectionHeader, "1. Overview"),
            fragment(FragmentKind::Paragraph, "Revenue grew."),
            fragment(FragmentKind::ListItem, "• first point"),
            fragment(FragmentKind::Formula, "E = mc^2"),
            fragment(FragmentKind::Caption, "Figure 1: growth"),
            fragment(FragmentKind::Table, "| a | b |\n| --- | --- |\n| 1 | 2 |"),
            Fragment::new(FragmentKind::Picture, "", FragmentSource::LayoutDetector),
        ]);

        let result = to_markdown(&doc, &RenderOptions::default()).unwrap();
        let expected = "# Annual Report\n\n\
                        ## 1. Overview\n\n\
                        Revenue grew.\n\n\
                        - first point\n\n\
                        $$\nE = mc^2\n$$\n\n\
                        *Figure 1: growth*\n\n\
                        | a | b |\n| --- | --- |\n| 1 | 2 |\n\n\
                        <!-- picture -->";
        assert_eq!(result, expected);
    }

    #[test]
    fn test_formula_already_delimited() {
        let doc = doc_with(vec![fragment(FragmentKind::Formula, "$$x^2$$")]);
        assert_eq!(to_markdown(&doc, &RenderOptions::default()).unwrap(), "$$x^2$$");
    }

    #[test]
    fn test_page_furniture_hidden_by_default() {
        let doc = doc_with(vec![
            fragment(FragmentKind::PageHeader, "ACME Corp"),
            fragment(FragmentKind::Paragraph, "Body"),
            fragment(FragmentKind::PageFooter, "Page 1"),
        ]);

        assert_eq!(to_markdown(&doc, &RenderOptions::default()).unwrap(), "Body");

        let options = RenderOptions::default().with_page_furniture(true);
        assert_eq!(
            to_markdown(&doc, &options).unwrap(),
            "ACME Corp\n\nBody\n\nPage 1"
        );
    }

    #[test]
    fn test_page_markers_and_frontmatter() {
        let mut doc = doc_with(vec![fragment(FragmentKind::Paragraph, "Body")]);
        doc.metadata.title = Some("Test Doc".to_string());

        let options = RenderOptions::new().with_frontmatter(true).with_page_markers(true);
        let result = to_markdown(&doc, &options).unwrap();
        assert!(result.starts_with("---\ntitle: \"Test Doc\""));
        assert!(result.contains("<!-- page 1 -->\n\nBody"));
    }

    #[test]
    fn test_empty_fragments_skipped() {
        let doc = doc_with(vec![
            fragment(FragmentKind::Paragraph, "   "),
            fragment(FragmentKind::Paragraph, "Kept"),
        ]);
        assert_eq!(to_markdown(&doc, &RenderOptions::default()).unwrap(), "Kept");
    }
}
