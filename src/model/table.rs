//! Table types.

use serde::{Deserialize, Serialize};

use super::{BoundingRegion, Span};

/// A caption or footnote attached to a table or figure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextRegion {
    pub content: String,
    pub spans: Vec<Span>,
    pub bounding_regions: Vec<BoundingRegion>,
    pub elements: Vec<String>,
}

/// A table detected by the analysis service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Table {
    pub row_count: usize,
    pub column_count: usize,
    pub cells: Vec<TableCell>,
    pub caption: Option<TextRegion>,
    pub footnotes: Vec<TextRegion>,
    pub spans: Vec<Span>,
    pub bounding_regions: Vec<BoundingRegion>,
}

/// Role of a table cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    #[default]
    Content,
    RowHeader,
    ColumnHeader,
    StubHead,
    Description,
}

/// A single table cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableCell {
    pub kind: CellKind,
    pub row_index: usize,
    pub column_index: usize,
    pub row_span: Option<usize>,
    pub column_span: Option<usize>,
    pub content: String,
    pub spans: Vec<Span>,
    pub bounding_regions: Vec<BoundingRegion>,
}

/// Structured form of a rendered table.
///
/// Header rows are folded into a multi-level column header and leading
/// row-header columns into a multi-level row index, leaving `rows` with only
/// the data cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularData {
    /// One entry per data column, each holding that column's header levels
    pub columns: Vec<Vec<String>>,

    /// Header levels of the index columns
    pub index_names: Vec<Vec<String>>,

    /// Data rows
    pub rows: Vec<TabularRow>,
}

/// A data row of [`TabularData`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularRow {
    /// Row-header values, one per index column
    pub index: Vec<String>,

    /// Data values, one per column
    pub values: Vec<String>,
}

impl TabularData {
    /// Number of header rows folded into the column header.
    pub fn header_levels(&self) -> usize {
        self.columns
            .iter()
            .chain(self.index_names.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
