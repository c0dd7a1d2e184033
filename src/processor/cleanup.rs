//! Normalization of text extracted from PDF content streams.

use crate::error::{Error, Result};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Cleans selectable text before it is measured and split into paragraphs.
///
/// Paragraph breaks (blank lines) survive; everything else is normalized.
#[derive(Debug, Clone)]
pub struct TextCleanup {
    hyphenation: Regex,
    inline_spaces: Regex,
    blank_lines: Regex,
}

impl TextCleanup {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::Other(format!("invalid cleanup pattern: {}", e)))
        };
        Ok(Self {
            // "infor-\nmation" → "information"
            hyphenation: compile(r"([A-Za-z])-[ \t]*\n[ \t]*([a-z])")?,
            inline_spaces: compile(r"[ \t]{2,}")?,
            // Whitespace-only lines count as blank
            blank_lines: compile(r"\n[ \t]*(?:\n[ \t]*)+")?,
        })
    }

    pub fn process(&self, text: &str) -> String {
        let mut result: String = text.replace("\r\n", "\n").replace('\r', "\n").nfc().collect();

        for (ligature, replacement) in LIGATURES {
            if result.contains(ligature) {
                result = result.replace(ligature, replacement);
            }
        }

        result = result
            .chars()
            .filter(|&c| !is_private_use(c) && c != '\u{FFFD}')
            .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
            .collect();

        result = self.hyphenation.replace_all(&result, "$1$2").into_owned();
        result = self.inline_spaces.replace_all(&result, " ").into_owned();
        result = self.blank_lines.replace_all(&result, "\n\n").into_owned();

        result.trim().to_string()
    }
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleanup() -> TextCleanup {
        TextCleanup::new().unwrap()
    }

    #[test]
    fn test_unicode_normalization() {
        let result = cleanup().process("cafe\u{0301}");
        assert_eq!(result, "café");
    }

    #[test]
    fn test_ligature_fix() {
        assert_eq!(cleanup().process("ﬁnding ﬂowers"), "finding flowers");
    }

    #[test]
    fn test_hyphenation_fix() {
        let result = cleanup().process("This is infor-\nmation about con-\n sectetuer.");
        assert_eq!(result, "This is information about consectetuer.");
        assert_eq!(cleanup().process("well-known"), "well-known");
    }

    #[test]
    fn test_blank_lines_collapse() {
        let result = cleanup().process("First\r\n \r\n\r\n\tSecond\nline");
        assert_eq!(result, "First\n\nSecond\nline");
    }

    #[test]
    fn test_removes_noise_characters() {
        let result = cleanup().process("a\u{E000}b\u{FFFD}c\u{0007}d   e\tf");
        assert_eq!(result, "abcd e\tf");
    }
}
