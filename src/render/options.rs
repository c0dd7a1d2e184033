//! Rendering options.

/// Options for rendering document content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Include YAML frontmatter with metadata (Markdown only)
    pub include_frontmatter: bool,

    /// Include page headers and footers
    pub include_page_furniture: bool,

    /// Emit an HTML comment before each page (Markdown only)
    pub page_markers: bool,

    /// Escape special Markdown characters in body text
    pub escape_special_chars: bool,

    /// Line written for picture fragments (Markdown only)
    pub picture_placeholder: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Enable or disable page headers and footers.
    pub fn with_page_furniture(mut self, include: bool) -> Self {
        self.include_page_furniture = include;
        self
    }

    /// Enable or disable page markers.
    pub fn with_page_markers(mut self, enable: bool) -> Self {
        self.page_markers = enable;
        self
    }

    /// Enable or disable Markdown escaping of body text.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set the picture placeholder line.
    pub fn with_picture_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.picture_placeholder = placeholder.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            include_page_furniture: false,
            page_markers: false,
            escape_special_chars: false,
            picture_placeholder: "<!-- picture -->".to_string(),
        }
    }
}
