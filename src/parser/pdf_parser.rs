//! PDF document parser using lopdf.

use std::io::Read;
use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::detect::detect_format_from_path;
use crate::error::{Error, Result};
use crate::model::{Metadata, ProcessingMethod};

/// Read-only access to a PDF: page list, metadata and selectable text.
pub struct PdfParser {
    doc: LopdfDocument,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's a PDF
        detect_format_from_path(path)?;

        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc)
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn from_document(doc: LopdfDocument) -> Result<Self> {
        // lopdf 0.34 cannot decrypt; extracted text would be garbage.
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// Page numbers (1-indexed) in document order.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.doc.get_pages().keys().copied().collect()
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Raw embedded text of a page.
    pub fn page_text(&self, page_num: u32) -> Result<String> {
        let total = self.page_count();
        if page_num == 0 || page_num > total {
            return Err(Error::PageOutOfRange(page_num, total));
        }
        self.doc
            .extract_text(&[page_num])
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page_num, e)))
    }

    /// Embedded text of a page, trimmed; `None` when the page has none or
    /// extraction fails.
    pub fn selectable_text(&self, page_num: u32) -> Option<String> {
        match self.page_text(page_num) {
            Ok(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Err(e) => {
                log::debug!("No selectable text on page {}: {}", page_num, e);
                None
            }
        }
    }

    /// Document metadata (version, title, author, dates, page count).
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata {
            processing_method: ProcessingMethod::PdfProcessing,
            pdf_version: Some(self.version()),
            page_count: self.page_count(),
            ..Default::default()
        };

        if let Some(info_dict) = self.info_dictionary() {
            metadata.title = get_string_from_dict(info_dict, b"Title");
            metadata.author = get_string_from_dict(info_dict, b"Author");

            if let Some(date_str) = get_string_from_dict(info_dict, b"CreationDate") {
                metadata.created = parse_pdf_date(&date_str);
            }
            if let Some(date_str) = get_string_from_dict(info_dict, b"ModDate") {
                metadata.modified = parse_pdf_date(&date_str);
            }
        }

        metadata
    }

    fn info_dictionary(&self) -> Option<&lopdf::Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            lopdf::Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            lopdf::Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

/// Helper to get a string from a PDF dictionary.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        lopdf::Object::String(bytes, _) => {
            // UTF-16BE with BOM is the PDF text-string encoding for Unicode
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                String::from_utf8(bytes.clone())
                    .ok()
                    .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
            }
        }
        lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    })
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:").unwrap_or(s);

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let field = |range: std::ops::Range<usize>, default: u32| {
        s.get(range).and_then(|v| v.parse().ok()).unwrap_or(default)
    };

    chrono::NaiveDate::from_ymd_opt(year, field(4..6, 1), field(6..8, 1))
        .and_then(|date| date.and_hms_opt(field(8..10, 0), field(10..12, 0), field(12..14, 0)))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use lopdf::{dictionary, Object, Stream, StringFormat};

    fn build_pdf(pages: &[&str]) -> Vec<u8> {
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
            let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
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
            "Title" => Object::String(b"Quarterly Report".to_vec(), StringFormat::Literal),
            "CreationDate" => Object::String(b"D:20240115103045".to_vec(), StringFormat::Literal),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_page_count_and_text() {
        let parser = PdfParser::from_bytes(&build_pdf(&["Hello page one", ""])).unwrap();
        assert_eq!(parser.page_count(), 2);
        assert_eq!(parser.page_numbers(), vec![1, 2]);
        assert!(parser.selectable_text(1).unwrap().contains("Hello page one"));
        assert_eq!(parser.selectable_text(2), None);
    }

    #[test]
    fn test_page_out_of_range() {
        let parser = PdfParser::from_bytes(&build_pdf(&["x"])).unwrap();
        assert!(matches!(parser.page_text(0), Err(Error::PageOutOfRange(0, 1))));
        assert!(matches!(parser.page_text(5), Err(Error::PageOutOfRange(5, 1))));
        assert_eq!(parser.selectable_text(5), None);
    }

    #[test]
    fn test_metadata() {
        let parser = PdfParser::from_bytes(&build_pdf(&["a", "b", "c"])).unwrap();
        let meta = parser.metadata();
        assert_eq!(meta.page_count, 3);
        assert_eq!(meta.pdf_version.as_deref(), Some("1.5"));
        assert_eq!(meta.title.as_deref(), Some("Quarterly Report"));
        assert_eq!(meta.created.map(|d| d.year()), Some(2024));
    }

    #[test]
    fn test_not_a_pdf() {
        assert!(PdfParser::from_bytes(b"plain text, not a pdf").is_err());
    }

    #[test]
    fn test_parse_pdf_date() {
        let date = parse_pdf_date("D:20240115103045+09'00'").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
        assert_eq!(date.hour(), 10);
    }

    #[test]
    fn test_parse_pdf_date_minimal() {
        let date = parse_pdf_date("D:2024").unwrap();
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
        assert!(parse_pdf_date("D:20").is_none());
    }

    #[test]
    fn test_utf16_dict_string() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Été".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let dict = dictionary! { "Author" => Object::String(bytes, StringFormat::Hexadecimal) };
        assert_eq!(get_string_from_dict(&dict, b"Author").as_deref(), Some("Été"));
    }
}
