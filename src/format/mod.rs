//! Per-element unit producers.
//!
//! Each element kind has a formatter turning one element into zero or more
//! [`OutputUnit`](crate::model::OutputUnit)s from configurable templates. The
//! assembler sees them as one capability set through [`Formatters`].

mod config;
mod figure;
mod image;
mod page;
mod section;
mod substitute;
mod table;
mod template;
mod text;

pub use config::FormatConfig;
pub use figure::FigureFormatter;
pub use image::{
    figure_pixel_rect, rotate_point, IdentityTransformer, ImageTransformer, PageImageCache,
    PixelRect, TransformedImage,
};
pub use page::{ImagePlacement, PageFormatter};
pub use section::SectionFormatter;
pub use substitute::{latex_to_text, substitute_formulas_and_barcodes, SelectionMarkFormatter};
pub use table::{render_table, RenderedTable, TableFormatter};
pub use template::{Template, TemplateList};
pub use text::{KeyValueFormatter, LineFormatter, ParagraphFormatter, WordFormatter};

use crate::error::Result;
use crate::model::{AnalysisResult, Barcode, ElementInfo, Formula, Numbering, Span, UnitMeta};

/// The full set of unit producers used by one pipeline.
#[derive(Debug, Clone, Default)]
pub struct Formatters {
    pub page: PageFormatter,
    pub section: SectionFormatter,
    pub paragraph: ParagraphFormatter,
    pub line: LineFormatter,
    pub word: WordFormatter,
    pub key_value: KeyValueFormatter,
    pub table: TableFormatter,
    pub figure: FigureFormatter,
    pub selection_marks: SelectionMarkFormatter,
}

impl Formatters {
    /// Build formatters from a JSON [`FormatConfig`].
    pub fn from_json(json: &str) -> Result<Self> {
        FormatConfig::from_json(json)?.build()
    }
}

/// Document-wide state handed to every unit producer.
#[derive(Clone, Copy)]
pub struct UnitContext<'c> {
    pub result: &'c AnalysisResult,
    pub formulas: &'c [&'c Formula],
    pub barcodes: &'c [&'c Barcode],
    /// Numbering of the section currently being emitted
    pub numbering: Option<&'c Numbering>,
    pub selection_marks: &'c SelectionMarkFormatter,
}

impl<'c> UnitContext<'c> {
    /// Text of an element with its formula, barcode and checkbox placeholders
    /// replaced.
    pub fn resolve_text(&self, content: &str, spans: &[Span]) -> Result<String> {
        let text =
            substitute_formulas_and_barcodes(content, spans, self.formulas, self.barcodes)?;
        Ok(self.selection_marks.format(&text))
    }

    /// Metadata for a unit produced from `info`.
    pub fn meta(&self, info: &ElementInfo<'_>) -> UnitMeta {
        UnitMeta::new(
            info.element_id.clone(),
            info.kind(),
            info.start_page_number,
            self.numbering.cloned(),
        )
    }
}
