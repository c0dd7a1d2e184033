//! PDF parsing module.

mod options;
mod pdf_parser;

pub use options::{
    ErrorMode, PageSelection, ProcessOptions, DEFAULT_DPI, DEFAULT_MIN_TEXT_LEN,
};
pub use pdf_parser::PdfParser;
