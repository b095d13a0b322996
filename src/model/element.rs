//! Element variants and the per-element metadata computed before ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    AnalyzedDocument, DocumentList, Figure, KeyValuePair, Line, Page, Paragraph, Section,
    SelectionMark, Span, SpanBounds, Table, Word,
};

/// Kind of an analysis element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Page,
    Section,
    Paragraph,
    Line,
    Word,
    Table,
    Figure,
    KeyValuePair,
    SelectionMark,
    List,
    Document,
}

impl ElementKind {
    /// Ordering priority at equal page and start offset. Lower values open
    /// first so that aggregates claim their spans before nested text.
    pub fn priority(self) -> u8 {
        match self {
            ElementKind::Page => 0,
            ElementKind::Section => 1,
            ElementKind::Table
            | ElementKind::Figure
            | ElementKind::KeyValuePair
            | ElementKind::List
            | ElementKind::Document => 2,
            ElementKind::Paragraph => 3,
            ElementKind::Line | ElementKind::SelectionMark => 4,
            ElementKind::Word => 5,
        }
    }

    /// Whether the element is dropped when a claimed span already covers it.
    pub fn is_suppressible(self) -> bool {
        matches!(
            self,
            ElementKind::KeyValuePair
                | ElementKind::Paragraph
                | ElementKind::Line
                | ElementKind::Word
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Page => "page",
            ElementKind::Section => "section",
            ElementKind::Paragraph => "paragraph",
            ElementKind::Line => "line",
            ElementKind::Word => "word",
            ElementKind::Table => "table",
            ElementKind::Figure => "figure",
            ElementKind::KeyValuePair => "keyValuePair",
            ElementKind::SelectionMark => "selectionMark",
            ElementKind::List => "list",
            ElementKind::Document => "document",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A borrowed element of an [`AnalysisResult`](super::AnalysisResult).
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    Page(&'a Page),
    Section(&'a Section),
    Paragraph(&'a Paragraph),
    Line(&'a Line),
    Word(&'a Word),
    Table(&'a Table),
    Figure(&'a Figure),
    KeyValuePair(&'a KeyValuePair),
    SelectionMark(&'a SelectionMark),
    List(&'a DocumentList),
    Document(&'a AnalyzedDocument),
}

impl<'a> Element<'a> {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Page(_) => ElementKind::Page,
            Element::Section(_) => ElementKind::Section,
            Element::Paragraph(_) => ElementKind::Paragraph,
            Element::Line(_) => ElementKind::Line,
            Element::Word(_) => ElementKind::Word,
            Element::Table(_) => ElementKind::Table,
            Element::Figure(_) => ElementKind::Figure,
            Element::KeyValuePair(_) => ElementKind::KeyValuePair,
            Element::SelectionMark(_) => ElementKind::SelectionMark,
            Element::List(_) => ElementKind::List,
            Element::Document(_) => ElementKind::Document,
        }
    }

    /// Every span of the element. Key-value pairs report the key spans
    /// followed by the value spans.
    pub fn spans(&self) -> Vec<Span> {
        match self {
            Element::Page(page) => page.spans.clone(),
            Element::Section(section) => section.spans.clone(),
            Element::Paragraph(para) => para.spans.clone(),
            Element::Line(line) => line.spans.clone(),
            Element::Word(word) => vec![word.span],
            Element::Table(table) => table.spans.clone(),
            Element::Figure(figure) => figure.spans.clone(),
            Element::KeyValuePair(pair) => pair.spans(),
            Element::SelectionMark(mark) => vec![mark.span],
            Element::List(list) => list.spans.clone(),
            Element::Document(doc) => doc.spans.clone(),
        }
    }
}

/// Outline position of a section, e.g. `[2, 1]` for the first subsection of
/// the second top-level section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Numbering(pub Vec<u32>);

impl Numbering {
    pub fn new(levels: Vec<u32>) -> Self {
        Self(levels)
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn levels(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Markdown heading marker with one `#` per level.
    pub fn heading_hashes(&self) -> String {
        "#".repeat(self.depth())
    }
}

impl fmt::Display for Numbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, level) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", level)?;
        }
        Ok(())
    }
}

/// An element together with the metadata derived for it before ordering.
#[derive(Debug, Clone)]
pub struct ElementInfo<'a> {
    /// Path of the element in the result, e.g. "/tables/0" or "/pages/1/lines/12"
    pub element_id: String,
    pub element: Element<'a>,
    pub spans: Vec<Span>,

    /// Smallest bounds covering every span
    pub full_span_bounds: SpanBounds,

    /// 1-based page the element starts on
    pub start_page_number: u32,

    /// Numbering of the section containing the element, if any
    pub numbering: Option<Numbering>,
}

impl<'a> ElementInfo<'a> {
    pub fn kind(&self) -> ElementKind {
        self.element.kind()
    }

    /// Trailing index of the element id, 1-based. Used for table and figure
    /// numbers.
    pub fn element_number(&self) -> Option<usize> {
        self.element_id
            .rsplit('/')
            .next()
            .and_then(|index| index.parse::<usize>().ok())
            .map(|index| index + 1)
    }
}

/// A reference from a section to one of its children, e.g. "/paragraphs/3".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub collection: String,
    pub index: usize,
}

impl ElementRef {
    /// Parse a "/collection/index" path. Returns `None` for anything else.
    pub fn parse(path: &str) -> Option<Self> {
        let mut parts = path.trim_start_matches('/').split('/');
        let collection = parts.next().filter(|c| !c.is_empty())?;
        let index = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            collection: collection.to_string(),
            index,
        })
    }

    pub fn is_section(&self) -> bool {
        self.collection == "sections"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_table() {
        assert!(ElementKind::Page.priority() < ElementKind::Section.priority());
        assert_eq!(ElementKind::Table.priority(), ElementKind::Figure.priority());
        assert_eq!(
            ElementKind::KeyValuePair.priority(),
            ElementKind::Document.priority()
        );
        assert!(ElementKind::Figure.priority() < ElementKind::Paragraph.priority());
        assert_eq!(
            ElementKind::Line.priority(),
            ElementKind::SelectionMark.priority()
        );
        assert!(ElementKind::Line.priority() < ElementKind::Word.priority());
    }

    #[test]
    fn test_numbering_display() {
        let numbering = Numbering::new(vec![2, 1, 4]);
        assert_eq!(numbering.to_string(), "2.1.4");
        assert_eq!(numbering.heading_hashes(), "###");
        assert_eq!(Numbering::default().heading_hashes(), "");
    }

    #[test]
    fn test_element_ref_parse() {
        assert_eq!(
            ElementRef::parse("/paragraphs/12"),
            Some(ElementRef {
                collection: "paragraphs".to_string(),
                index: 12
            })
        );
        assert!(ElementRef::parse("/sections/1").unwrap().is_section());
        assert_eq!(ElementRef::parse("/paragraphs/x"), None);
        assert_eq!(ElementRef::parse("/pages/0/lines/3"), None);
        assert_eq!(ElementRef::parse(""), None);
    }

    #[test]
    fn test_word_spans() {
        let word = Word {
            content: "hi".into(),
            span: Span::new(4, 2),
            ..Default::default()
        };
        let element = Element::Word(&word);
        assert_eq!(element.kind(), ElementKind::Word);
        assert_eq!(element.spans(), vec![Span::new(4, 2)]);
    }
}
