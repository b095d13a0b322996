//! Table units and the Markdown/tabular table renderer.

use super::{TemplateList, UnitContext};
use crate::error::{Error, Result};
use crate::model::{
    CellKind, ElementInfo, OutputUnit, Table, TableCell, TabularData, TabularRow,
};

pub(crate) const TABLE_PLACEHOLDERS: &[&str] = &["table_number", "caption", "footnotes"];

/// Placeholder header used when a table has no header row.
const EMPTY_HEADER: &str = "<!-- -->";

/// Produces the text around a table and the table itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFormatter {
    before_formats: TemplateList,
    after_formats: TemplateList,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self {
            before_formats: TemplateList::builtin(
                &[
                    "**Table {table_number} Info**\n",
                    "*Table Caption:* {caption}",
                    "*Table Footnotes:* {footnotes}",
                    "*Table Content:*",
                ],
                TABLE_PLACEHOLDERS,
            ),
            after_formats: TemplateList::default(),
        }
    }
}

impl TableFormatter {
    pub fn new(before: &[impl AsRef<str>], after: &[impl AsRef<str>]) -> Result<Self> {
        Ok(Self {
            before_formats: TemplateList::parse(before, TABLE_PLACEHOLDERS)?,
            after_formats: TemplateList::parse(after, TABLE_PLACEHOLDERS)?,
        })
    }

    pub fn before_sources(&self) -> Vec<&str> {
        self.before_formats.sources()
    }

    pub fn after_sources(&self) -> Vec<&str> {
        self.after_formats.sources()
    }

    pub fn produce(
        &self,
        info: &ElementInfo<'_>,
        table: &Table,
        ctx: &UnitContext<'_>,
    ) -> Result<Vec<OutputUnit>> {
        let mut units = Vec::new();
        let has_text = !self.before_formats.is_empty() || !self.after_formats.is_empty();
        let values = if has_text {
            TableTextValues::new(info, table, ctx)?
        } else {
            TableTextValues::default()
        };

        if let Some(text) = self.before_formats.render(&values.as_pairs()) {
            units.push(OutputUnit::text(
                format!("{}_before_table_text", info.element_id),
                text,
                ctx.meta(info),
            ));
        }

        let rendered = render_table(table, ctx)
            .map_err(|err| match err {
                Error::ElementProcessing { message, .. } => {
                    Error::element(info.element_id.clone(), message)
                }
                other => other,
            })?;
        units.push(OutputUnit::table(
            format!("{}_table", info.element_id),
            format!("\n{}\n\n", rendered.markdown),
            rendered.data,
            ctx.meta(info),
        ));

        if let Some(text) = self.after_formats.render(&values.as_pairs()) {
            units.push(OutputUnit::text(
                format!("{}_after_table_text", info.element_id),
                text,
                ctx.meta(info),
            ));
        }
        Ok(units)
    }
}

#[derive(Default)]
struct TableTextValues {
    number: String,
    caption: String,
    footnotes: String,
}

impl TableTextValues {
    fn new(info: &ElementInfo<'_>, table: &Table, ctx: &UnitContext<'_>) -> Result<Self> {
        let caption = match &table.caption {
            Some(caption) => ctx.resolve_text(&caption.content, &caption.spans)?,
            None => String::new(),
        };
        let footnotes = table
            .footnotes
            .iter()
            .map(|note| ctx.resolve_text(&note.content, &note.spans))
            .collect::<Result<Vec<_>>>()?
            .join("\n");
        Ok(Self {
            number: info
                .element_number()
                .map(|n| n.to_string())
                .unwrap_or_default(),
            caption,
            footnotes,
        })
    }

    fn as_pairs(&self) -> [(&str, &str); 3] {
        [
            ("table_number", self.number.as_str()),
            ("caption", self.caption.as_str()),
            ("footnotes", self.footnotes.as_str()),
        ]
    }
}

/// A table rendered both as a GitHub pipe table and as structured data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub markdown: String,
    pub data: TabularData,
    pub header_rows: usize,
    pub index_columns: usize,
}

/// Render a table's cells.
///
/// Column-header cells mark leading header rows and row-header cells mark
/// leading index columns. Header cells are repeated across the columns (or
/// rows) they span so every data column has a complete header path. The
/// first header row becomes the pipe-table header; further header rows
/// follow the delimiter row. A table without header rows gets a blank
/// `<!-- -->` header.
pub fn render_table(table: &Table, ctx: &UnitContext<'_>) -> Result<RenderedTable> {
    let mut cells: Vec<&TableCell> = table.cells.iter().collect();
    cells.sort_by_key(|cell| (cell.row_index, cell.column_index));

    let mut header_rows = 0;
    let mut index_columns = 0;
    let mut row_count = table.row_count;
    let mut column_count = table.column_count;
    for cell in &cells {
        match cell.kind {
            CellKind::ColumnHeader => header_rows = header_rows.max(cell.row_index + 1),
            CellKind::RowHeader => index_columns = index_columns.max(cell.column_index + 1),
            _ => {}
        }
        row_count = row_count.max(cell.row_index + cell.row_span.unwrap_or(1));
        column_count = column_count.max(cell.column_index + cell.column_span.unwrap_or(1));
    }
    if row_count == 0 || column_count == 0 {
        return Err(Error::element("", "table has no cells"));
    }
    index_columns = index_columns.min(column_count);
    header_rows = header_rows.min(row_count);

    let mut grid = vec![vec![String::new(); column_count]; row_count];
    for cell in &cells {
        let text = ctx.resolve_text(&cell.content, &cell.spans)?;
        let text = clean_cell(&text);
        let (row, col) = (cell.row_index, cell.column_index);
        match cell.kind {
            CellKind::ColumnHeader => {
                let end = (col + cell.column_span.unwrap_or(1)).min(column_count);
                for target in &mut grid[row][col..end] {
                    *target = text.clone();
                }
            }
            CellKind::RowHeader => {
                let end = (row + cell.row_span.unwrap_or(1)).min(row_count);
                for grid_row in &mut grid[row..end] {
                    grid_row[col] = text.clone();
                }
            }
            _ => grid[row][col] = text,
        }
    }

    let data = TabularData {
        columns: (index_columns..column_count)
            .map(|col| (0..header_rows).map(|row| grid[row][col].clone()).collect())
            .collect(),
        index_names: (0..index_columns)
            .map(|col| (0..header_rows).map(|row| grid[row][col].clone()).collect())
            .collect(),
        rows: grid[header_rows..]
            .iter()
            .map(|row| TabularRow {
                index: row[..index_columns].to_vec(),
                values: row[index_columns..].to_vec(),
            })
            .collect(),
    };

    let mut lines = Vec::with_capacity(row_count + 2);
    if header_rows == 0 {
        lines.push(pipe_row(&vec![EMPTY_HEADER.to_string(); column_count]));
        lines.push(delimiter_row(column_count));
        lines.extend(grid.iter().map(|row| pipe_row(row)));
    } else {
        lines.push(pipe_row(&grid[0]));
        lines.push(delimiter_row(column_count));
        lines.extend(grid[1..].iter().map(|row| pipe_row(row)));
    }

    Ok(RenderedTable {
        markdown: lines.join("\n"),
        data,
        header_rows,
        index_columns,
    })
}

fn clean_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn pipe_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn delimiter_row(columns: usize) -> String {
    format!("|{}", "---|".repeat(columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SelectionMarkFormatter;
    use crate::model::{AnalysisResult, Element, SpanBounds, TextRegion};

    fn cell(kind: CellKind, row: usize, col: usize, content: &str) -> TableCell {
        TableCell {
            kind,
            row_index: row,
            column_index: col,
            content: content.to_string(),
            ..Default::default()
        }
    }

    fn render(table: &Table) -> Result<RenderedTable> {
        let result = AnalysisResult::default();
        let marks = SelectionMarkFormatter::default();
        let ctx = UnitContext {
            result: &result,
            formulas: &[],
            barcodes: &[],
            numbering: None,
            selection_marks: &marks,
        };
        render_table(table, &ctx)
    }

    #[test]
    fn test_simple_header() {
        let table = Table {
            row_count: 2,
            column_count: 2,
            cells: vec![
                cell(CellKind::ColumnHeader, 0, 0, "Name"),
                cell(CellKind::ColumnHeader, 0, 1, "Qty"),
                cell(CellKind::Content, 1, 1, "3"),
                cell(CellKind::Content, 1, 0, "Bolts | nuts"),
            ],
            ..Default::default()
        };
        let rendered = render(&table).unwrap();
        assert_eq!(
            rendered.markdown,
            "| Name | Qty |\n|---|---|\n| Bolts \\| nuts | 3 |"
        );
        assert_eq!(rendered.data.columns, vec![vec!["Name"], vec!["Qty"]]);
        assert_eq!(rendered.data.row_count(), 1);
    }

    #[test]
    fn test_no_header_rows() {
        let table = Table {
            row_count: 1,
            column_count: 2,
            cells: vec![
                cell(CellKind::Content, 0, 0, "a\nb"),
                cell(CellKind::Content, 0, 1, "c"),
            ],
            ..Default::default()
        };
        let rendered = render(&table).unwrap();
        assert_eq!(
            rendered.markdown,
            "| <!-- --> | <!-- --> |\n|---|---|\n| a b | c |"
        );
        assert_eq!(rendered.header_rows, 0);
    }

    #[test]
    fn test_multi_level_header_with_index() {
        let mut region = cell(CellKind::ColumnHeader, 0, 1, "2024");
        region.column_span = Some(2);
        let cells = vec![
            cell(CellKind::StubHead, 0, 0, "Region"),
            region,
            cell(CellKind::ColumnHeader, 1, 1, "H1"),
            cell(CellKind::ColumnHeader, 1, 2, "H2"),
            cell(CellKind::RowHeader, 2, 0, "North"),
            cell(CellKind::Content, 2, 1, "1"),
            cell(CellKind::Content, 2, 2, "2"),
            cell(CellKind::RowHeader, 3, 0, "South"),
            cell(CellKind::Content, 3, 1, "3"),
            cell(CellKind::Content, 3, 2, "4"),
            cell(CellKind::RowHeader, 4, 0, "East"),
            cell(CellKind::Content, 4, 1, "5"),
            cell(CellKind::Content, 4, 2, "6"),
        ];
        let table = Table {
            row_count: 5,
            column_count: 3,
            cells,
            ..Default::default()
        };
        let rendered = render(&table).unwrap();
        assert_eq!(rendered.header_rows, 2);
        assert_eq!(rendered.index_columns, 1);
        assert_eq!(rendered.data.row_count(), 3);
        assert_eq!(rendered.data.header_levels(), 2);
        assert_eq!(
            rendered.data.columns,
            vec![vec!["2024", "H1"], vec!["2024", "H2"]]
        );
        assert_eq!(rendered.data.rows[1].index, vec!["South"]);
        let lines: Vec<&str> = rendered.markdown.lines().collect();
        assert_eq!(lines[0], "| Region | 2024 | 2024 |");
        assert_eq!(lines[2], "|  | H1 | H2 |");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_empty_table_is_element_error() {
        assert!(matches!(
            render(&Table::default()),
            Err(Error::ElementProcessing { .. })
        ));
    }

    #[test]
    fn test_produce_units() {
        let table = Table {
            row_count: 1,
            column_count: 1,
            cells: vec![cell(CellKind::Content, 0, 0, "x")],
            caption: Some(TextRegion {
                content: "Totals".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = AnalysisResult::default();
        let marks = SelectionMarkFormatter::default();
        let ctx = UnitContext {
            result: &result,
            formulas: &[],
            barcodes: &[],
            numbering: None,
            selection_marks: &marks,
        };
        let info = ElementInfo {
            element_id: "/tables/1".to_string(),
            element: Element::Table(&table),
            spans: Vec::new(),
            full_span_bounds: SpanBounds::new(0, 1),
            start_page_number: 1,
            numbering: None,
        };
        let units = TableFormatter::default().produce(&info, &table, &ctx).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].id, "/tables/1_before_table_text");
        assert_eq!(
            units[0].text_content(),
            Some("**Table 2 Info**\n\n*Table Caption:* Totals\n*Table Content:*")
        );
        assert_eq!(units[1].id, "/tables/1_table");
        assert!(units[1].text_content().unwrap().starts_with("\n| <!-- -->"));
        assert!(units[1].text_content().unwrap().ends_with("|\n\n"));
    }
}
