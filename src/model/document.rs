//! Document-level types of a layout analysis result.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Barcode, BoundingRegion, Figure, Formula, Page, Paragraph, Span, Table};
use crate::error::{Error, Result};

/// The full element graph returned by the analysis service for one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    pub api_version: Option<String>,
    pub model_id: Option<String>,

    /// The flat text stream every span points into
    pub content: String,

    pub pages: Vec<Page>,
    pub sections: Vec<Section>,
    pub paragraphs: Vec<Paragraph>,
    pub tables: Vec<Table>,
    pub figures: Vec<Figure>,
    pub lists: Vec<DocumentList>,
    pub key_value_pairs: Vec<KeyValuePair>,
    pub documents: Vec<AnalyzedDocument>,
}

/// Service responses wrap the result in `{"analyzeResult": ...}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    analyze_result: AnalysisResult,
}

impl AnalysisResult {
    /// Decode a result from JSON, either bare or wrapped in `analyzeResult`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Decode a result from raw JSON bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(data)?;
        Self::from_value(value)
    }

    /// Read and decode a result file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_slice(&data)
    }

    fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidInput(
                "expected a JSON object at the top level".to_string(),
            ));
        }
        if value.get("analyzeResult").is_some() {
            let envelope: Envelope = serde_json::from_value(value)?;
            Ok(envelope.analyze_result)
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }

    /// Get a page by its 1-based page number.
    pub fn page(&self, page_number: u32) -> Option<&Page> {
        self.pages
            .iter()
            .find(|page| page.page_number == page_number)
    }

    /// The set of page numbers in the result.
    pub fn page_numbers(&self) -> BTreeSet<u32> {
        self.pages.iter().map(|page| page.page_number).collect()
    }

    /// Every formula in the document, in page order.
    pub fn formulas(&self) -> Vec<&Formula> {
        self.pages.iter().flat_map(|page| &page.formulas).collect()
    }

    /// Every barcode in the document, in page order.
    pub fn barcodes(&self) -> Vec<&Barcode> {
        self.pages.iter().flat_map(|page| &page.barcodes).collect()
    }

    /// Text of the content stream covered by `span`, if it lies inside it.
    pub fn text_of(&self, span: &Span) -> Option<&str> {
        self.content.get(span.offset..span.end())
    }
}

/// A logical section. Sections reference their children, including nested
/// sections, through element paths such as "/sections/2" or "/paragraphs/7".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Section {
    pub spans: Vec<Span>,
    pub elements: Vec<String>,
}

/// The key or value half of a key-value pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValueElement {
    pub content: String,
    pub spans: Vec<Span>,
    pub bounding_regions: Vec<BoundingRegion>,
}

/// A key-value pair extracted from a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValuePair {
    pub key: KeyValueElement,
    pub value: Option<KeyValueElement>,
    pub confidence: Option<f64>,
}

impl KeyValuePair {
    /// Spans of the key followed by spans of the value.
    pub fn spans(&self) -> Vec<Span> {
        self.key
            .spans
            .iter()
            .chain(self.value.iter().flat_map(|value| value.spans.iter()))
            .copied()
            .collect()
    }
}

/// A list detected by the analysis service. Lists have no unit producer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentList {
    pub spans: Vec<Span>,
    pub bounding_regions: Vec<BoundingRegion>,
}

/// A typed document produced by a prebuilt or custom extraction model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzedDocument {
    pub doc_type: String,
    pub spans: Vec<Span>,
    pub bounding_regions: Vec<BoundingRegion>,
    pub fields: serde_json::Value,
    pub confidence: Option<f64>,
}
