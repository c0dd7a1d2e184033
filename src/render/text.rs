//! Plain text rendering.

use crate::error::Result;
use crate::model::Document;

use super::RenderOptions;

/// Convert a document to plain text: fragment values joined by blank lines.
///
/// Page headers and footers are left out unless requested.
pub fn to_text(doc: &Document, options: &RenderOptions) -> Result<String> {
    let output = doc
        .fragments()
        .filter(|f| options.include_page_furniture || !f.kind().is_page_furniture())
        .map(|f| f.value().trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(output)
}
