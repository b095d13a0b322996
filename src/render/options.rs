//! Rendering options and configuration.

use std::ops::RangeInclusive;

/// Options for rendering output units.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Separator placed after a unit without its own separator
    pub default_separator: String,

    /// How image units are written
    pub image_mode: ImageMode,

    /// Prefix for linked image paths (e.g., "./images/")
    pub image_path_prefix: String,

    /// Include the page start and end units
    pub include_page_units: bool,

    /// Page selection
    pub page_selection: PageSelection,

    /// Line placed before each chunk by `chunks_to_markdown`
    pub chunk_prefix: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.default_separator = separator.into();
        self
    }

    /// Set the image mode.
    pub fn with_image_mode(mut self, mode: ImageMode) -> Self {
        self.image_mode = mode;
        self
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Include or exclude page units.
    pub fn with_page_units(mut self, include: bool) -> Self {
        self.include_page_units = include;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.page_selection = PageSelection::Range(range);
        self
    }

    /// Set the chunk prefix.
    pub fn with_chunk_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.chunk_prefix = prefix.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_separator: "\n".to_string(),
            image_mode: ImageMode::Embed,
            image_path_prefix: String::new(),
            include_page_units: true,
            page_selection: PageSelection::All,
            chunk_prefix: "**###### Start of New Chunk ######**".to_string(),
        }
    }
}

/// How image units appear in Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// Inline `data:` URL
    #[default]
    Embed,
    /// Link to a file named after the unit id (see `save_images`)
    Link,
    /// Leave images out
    Omit,
}

/// Page selection for rendering.
#[derive(Debug, Clone, Default)]
pub enum PageSelection {
    /// Render all pages
    #[default]
    All,
    /// Render a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Render specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid start page")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid end page")?;
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start: u32 = start.trim().parse().map_err(|_| "Invalid page number")?;
                let end: u32 = end.trim().parse().map_err(|_| "Invalid page number")?;
                pages.extend(start..=end);
            } else {
                pages.push(part.parse().map_err(|_| "Invalid page number")?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}
