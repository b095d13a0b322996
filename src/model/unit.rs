//! Output units produced by the content assembler.

use serde::{Deserialize, Serialize};

use super::{ElementKind, Numbering, PageImage, TabularData};

/// Where a page unit sits relative to the page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLocation {
    Start,
    End,
}

/// Metadata attached to every output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitMeta {
    pub element_id: String,
    pub element_kind: ElementKind,
    pub page_number: u32,

    /// Numbering of the section the unit was emitted in
    pub section_numbering: Option<Numbering>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_location: Option<PageLocation>,

    /// Rotation in degrees applied to the source page image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_applied: Option<f64>,
}

impl UnitMeta {
    pub fn new(
        element_id: impl Into<String>,
        element_kind: ElementKind,
        page_number: u32,
        section_numbering: Option<Numbering>,
    ) -> Self {
        Self {
            element_id: element_id.into(),
            element_kind,
            page_number,
            section_numbering,
            page_location: None,
            rotation_applied: None,
        }
    }

    pub fn at(mut self, location: PageLocation) -> Self {
        self.page_location = Some(location);
        self
    }
}

/// Payload of an output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UnitContent {
    Text {
        text: String,
    },
    Table {
        text: String,
        data: TabularData,
    },
    Image {
        /// Text shown alongside the image, such as an intro line
        text: Option<String>,
        image: PageImage,
        /// Description filled in by an image captioner
        description: Option<String>,
    },
}

/// One atomic piece of reconstructed content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputUnit {
    pub id: String,
    pub content: UnitContent,
    pub meta: UnitMeta,

    /// Separator placed after this unit instead of the renderer default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl OutputUnit {
    pub fn text(id: impl Into<String>, text: impl Into<String>, meta: UnitMeta) -> Self {
        Self {
            id: id.into(),
            content: UnitContent::Text { text: text.into() },
            meta,
            separator: None,
        }
    }

    pub fn table(
        id: impl Into<String>,
        text: impl Into<String>,
        data: TabularData,
        meta: UnitMeta,
    ) -> Self {
        Self {
            id: id.into(),
            content: UnitContent::Table {
                text: text.into(),
                data,
            },
            meta,
            separator: None,
        }
    }

    pub fn image(
        id: impl Into<String>,
        text: Option<String>,
        image: PageImage,
        meta: UnitMeta,
    ) -> Self {
        Self {
            id: id.into(),
            content: UnitContent::Image {
                text,
                image,
                description: None,
            },
            meta,
            separator: None,
        }
    }

    /// Set an explicit separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Text of the unit (the intro text for images).
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            UnitContent::Text { text } | UnitContent::Table { text, .. } => Some(text),
            UnitContent::Image { text, .. } => text.as_deref(),
        }
    }

    /// Whether the unit carries text or a table.
    pub fn is_textual(&self) -> bool {
        !self.is_image()
    }

    pub fn is_image(&self) -> bool {
        matches!(self.content, UnitContent::Image { .. })
    }
}
