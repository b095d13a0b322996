//! Page-level elements of an analysis result.

use serde::{Deserialize, Serialize};

use super::Span;

/// A polygon on a page as a flat `[x1, y1, x2, y2, ...]` list in page units.
pub type Polygon = Vec<f64>;

/// Location of an element on one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    pub page_number: u32,
    #[serde(default)]
    pub polygon: Polygon,
}

/// One page of the analyzed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    /// 1-based page number
    pub page_number: u32,

    /// Clockwise rotation of the page content in degrees
    pub angle: Option<f64>,

    /// Page width in `unit`
    pub width: Option<f64>,

    /// Page height in `unit`
    pub height: Option<f64>,

    /// Unit of the page dimensions ("inch" or "pixel")
    pub unit: Option<String>,

    pub spans: Vec<Span>,
    pub words: Vec<Word>,
    pub lines: Vec<Line>,
    pub selection_marks: Vec<SelectionMark>,
    pub formulas: Vec<Formula>,
    pub barcodes: Vec<Barcode>,
}

impl Page {
    /// Page dimensions, if the service reported them.
    pub fn dimensions(&self) -> Option<(f64, f64)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some((w, h)),
            _ => None,
        }
    }
}

/// A single word.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Word {
    pub content: String,
    pub polygon: Polygon,
    pub span: Span,
    pub confidence: Option<f64>,
}

/// A line of text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Line {
    pub content: String,
    pub polygon: Polygon,
    pub spans: Vec<Span>,
}

/// A checkbox or radio button.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionMark {
    /// "selected" or "unselected"
    pub state: String,
    pub polygon: Polygon,
    pub span: Span,
    pub confidence: Option<f64>,
}

/// A formula, referenced from surrounding text by a `:formula:` placeholder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Formula {
    /// "inline" or "display"
    pub kind: String,
    /// LaTeX source
    pub value: String,
    pub polygon: Polygon,
    pub span: Span,
    pub confidence: Option<f64>,
}

/// A barcode, referenced from surrounding text by a `:barcode:` placeholder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Barcode {
    pub kind: String,
    pub value: String,
    pub polygon: Polygon,
    pub span: Span,
    pub confidence: Option<f64>,
}
