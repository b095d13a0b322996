//! Typed model of a layout analysis result and of the units reconstructed
//! from it.
//!
//! The analysis types mirror the service's camelCase JSON. Elements are
//! borrowed from the result through [`Element`], and every element carries
//! one or more [`Span`]s into the result's flat `content` stream.

mod document;
mod element;
mod figure;
mod page;
mod paragraph;
mod resource;
mod span;
mod table;
mod unit;

pub use document::{
    AnalysisResult, AnalyzedDocument, DocumentList, KeyValueElement, KeyValuePair, Section,
};
pub use element::{Element, ElementInfo, ElementKind, ElementRef, Numbering};
pub use figure::Figure;
pub use page::{Barcode, BoundingRegion, Formula, Line, Page, Polygon, SelectionMark, Word};
pub use paragraph::{Paragraph, ParagraphRole};
pub use resource::{PageImage, PageImages};
pub use span::{Span, SpanBounds};
pub use table::{CellKind, Table, TableCell, TabularData, TabularRow, TextRegion};
pub use unit::{OutputUnit, PageLocation, UnitContent, UnitMeta};
