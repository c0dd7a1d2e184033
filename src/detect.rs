//! Input format sniffing: PDF headers and raster image magic bytes.

use crate::error::{Error, Result};
use image::ImageFormat;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF format information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// What kind of input a byte stream holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    /// A PDF document
    Pdf(PdfFormat),
    /// A raster page image
    Image(ImageFormat),
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"
const SNIFF_LEN: usize = 16;

/// Detect PDF format from a file path.
///
/// # Example
/// ```no_run
/// use documentor::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("document.pdf").unwrap();
/// println!("PDF version: {}", format.version);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let header = read_header(path.as_ref())?;
    detect_format_from_bytes(&header)
}

/// Detect PDF format from bytes.
///
/// Returns `Error::UnknownFormat` when the data does not start with a PDF
/// header and `Error::UnsupportedVersion` when the version is malformed.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN {
        return Err(Error::UnknownFormat);
    }

    if !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat { version })
}

/// Detect a raster image format from magic bytes.
///
/// Only formats the model servers reliably accept are recognized.
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    match bytes {
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(ImageFormat::Png),
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some(ImageFormat::WebP),
        // TIFF: II or MM
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Some(ImageFormat::Tiff),
        _ => None,
    }
}

/// Classify a byte prefix as PDF or image.
pub fn sniff_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.starts_with(PDF_MAGIC) {
        return detect_format_from_bytes(data).map(SourceFormat::Pdf);
    }
    detect_image_format(data)
        .map(SourceFormat::Image)
        .ok_or(Error::UnknownFormat)
}

/// Classify a file as PDF or image by its content, not its extension.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let header = read_header(path.as_ref())?;
    sniff_bytes(&header)
}

fn read_header(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut header)?;
    Ok(header)
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    if version.len() != 3 {
        return false;
    }

    let chars: Vec<char> = version.chars().collect();
    chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

/// Check if a file is a valid PDF.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes represent a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
