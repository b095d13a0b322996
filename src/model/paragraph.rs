//! Paragraph types.

use serde::{Deserialize, Serialize};

use super::{BoundingRegion, Span};

/// Semantic role assigned to a paragraph by the layout model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParagraphRole {
    Title,
    SectionHeading,
    Footnote,
    PageHeader,
    PageFooter,
    PageNumber,
    FormulaBlock,
    /// A role this crate does not know about
    Other(String),
}

impl ParagraphRole {
    /// Wire name of the role.
    pub fn as_str(&self) -> &str {
        match self {
            ParagraphRole::Title => "title",
            ParagraphRole::SectionHeading => "sectionHeading",
            ParagraphRole::Footnote => "footnote",
            ParagraphRole::PageHeader => "pageHeader",
            ParagraphRole::PageFooter => "pageFooter",
            ParagraphRole::PageNumber => "pageNumber",
            ParagraphRole::FormulaBlock => "formulaBlock",
            ParagraphRole::Other(role) => role,
        }
    }
}

impl From<String> for ParagraphRole {
    fn from(role: String) -> Self {
        match role.as_str() {
            "title" => ParagraphRole::Title,
            "sectionHeading" => ParagraphRole::SectionHeading,
            "footnote" => ParagraphRole::Footnote,
            "pageHeader" => ParagraphRole::PageHeader,
            "pageFooter" => ParagraphRole::PageFooter,
            "pageNumber" => ParagraphRole::PageNumber,
            "formulaBlock" => ParagraphRole::FormulaBlock,
            _ => ParagraphRole::Other(role),
        }
    }
}

impl From<ParagraphRole> for String {
    fn from(role: ParagraphRole) -> Self {
        role.as_str().to_string()
    }
}

/// A paragraph of text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paragraph {
    /// Role of the paragraph, `None` for body text
    pub role: Option<ParagraphRole>,
    pub content: String,
    pub spans: Vec<Span>,
    pub bounding_regions: Vec<BoundingRegion>,
}

impl Paragraph {
    /// Create a body-text paragraph covering a single span.
    pub fn new(content: impl Into<String>, span: Span) -> Self {
        Self {
            content: content.into(),
            spans: vec![span],
            ..Default::default()
        }
    }

    /// Set the paragraph role.
    pub fn with_role(mut self, role: ParagraphRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Whether the paragraph is a title or section heading.
    pub fn is_heading(&self) -> bool {
        matches!(
            self.role,
            Some(ParagraphRole::Title) | Some(ParagraphRole::SectionHeading)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_names() {
        let role: ParagraphRole = serde_json::from_str("\"sectionHeading\"").unwrap();
        assert_eq!(role, ParagraphRole::SectionHeading);

        let unknown: ParagraphRole = serde_json::from_str("\"marginNote\"").unwrap();
        assert_eq!(unknown, ParagraphRole::Other("marginNote".to_string()));
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "\"marginNote\"");
    }

    #[test]
    fn test_paragraph_deserialize() {
        let json = r#"{"role": "title", "content": "Report", "spans": [{"offset": 0, "length": 6}]}"#;
        let para: Paragraph = serde_json::from_str(json).unwrap();
        assert!(para.is_heading());
        assert_eq!(para.spans, vec![Span::new(0, 6)]);
        assert!(para.bounding_regions.is_empty());
    }
}
