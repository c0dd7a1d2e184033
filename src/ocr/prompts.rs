//! Prompts sent to the model servers.

/// User prompt of the layout detector.
pub const LAYOUT_PROMPT: &str = "Please output the layout information from this PDF image, \
including each layout's bbox and its category. The bbox should be in the format [x1, y1, x2, y2]. \
The layout categories for the PDF document include ['Caption', 'Footnote', 'Formula', 'List-item', \
'Page-footer', 'Page-header', 'Picture', 'Section-header', 'Table', 'Text', 'Title']. \
Do not output the corresponding text. The layout result should be in JSON format.";

/// System prompt of the text recognizer.
pub const RECOGNITION_SYSTEM_PROMPT: &str = "You are an OCR specialist. Your task is to transcribe \
the text from the image exactly as it appears.

OUTPUT FORMAT: Plain text only. No JSON, no markup, no commentary.

RULES:
- Transcribe every visible word in reading order.
- Preserve original spelling, punctuation, line breaks, case, and special characters.
- Do NOT add any explanations, reasoning (e.g., <think>), or formatting.
- Ignore non-text elements (logos, borders, noise).
- Output only the raw transcription.";

/// User prompt of the text recognizer.
pub const RECOGNITION_USER_PROMPT: &str =
    "Transcribe the text from the image exactly. Output only the text. No reasoning, no extra words.";

/// System prompt of the layout detector; states the exact image size so
/// coordinates come back in pixels of the image sent.
pub fn layout_system_prompt(width: u32, height: u32) -> String {
    format!(
        "You are a precise document layout analyzer. The input image is exactly {}x{} pixels.",
        width, height
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LayoutCategory;

    #[test]
    fn test_layout_prompt_lists_every_category() {
        for category in LayoutCategory::ALL {
            assert!(LAYOUT_PROMPT.contains(&format!("'{}'", category.label())));
        }
    }

    #[test]
    fn test_layout_system_prompt() {
        assert!(layout_system_prompt(1700, 2200).contains("1700x2200 pixels"));
    }
}
