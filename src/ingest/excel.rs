use calamine::{Data, Range, Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

use super::{ExtractError, catch_panic};

/// Extract every sheet of a workbook as a Markdown table, in workbook order
pub fn extract(path: &Path) -> Result<String, ExtractError> {
    catch_panic(|| {
        let mut workbook = open_workbook_auto(path)?;

        let mut blocks = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            debug!(sheet = %name, rows = range.height(), cols = range.width(), "loaded sheet");
            blocks.push(render_sheet(&name, &range));
        }

        Ok(blocks.join("\n\n"))
    })
}

/// `### Sheet: <name>` followed by the cleaned table
pub fn render_sheet(name: &str, range: &Range<Data>) -> String {
    format!("### Sheet: {}\n\n{}", name, Table::from_range(range).to_markdown())
}

/// A sheet reduced to a header row and data rows, all cells rendered as text
#[derive(Debug, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from a used range. The first row is the header.
    ///
    /// Data rows that are entirely empty are dropped, then every column whose
    /// remaining data cells are all empty. Header cells never keep a column
    /// alive on their own. Unnamed columns are numbered from the sheet's
    /// first column, not from the start of the used range.
    pub fn from_range(range: &Range<Data>) -> Self {
        let first_col = range.start().map_or(0, |(_, col)| col as usize);
        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Table::default();
        };

        let data: Vec<&[Data]> = rows
            .filter(|row| !row.iter().all(is_empty))
            .collect();

        let keep: Vec<usize> = (0..range.width())
            .filter(|&col| data.iter().any(|row| row.get(col).is_some_and(|c| !is_empty(c))))
            .collect();

        let headers: Vec<String> = keep
            .iter()
            .map(|&col| match header.get(col) {
                Some(cell) if !is_empty(cell) => cell_text(cell),
                _ => format!("Unnamed: {}", first_col + col),
            })
            .collect();

        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|row| {
                keep.iter()
                    .map(|&col| row.get(col).map(cell_text).unwrap_or_default())
                    .collect::<Vec<_>>()
            })
            .collect();

        Table { headers, rows }
    }

    /// Render as a Markdown pipe table. A table without columns renders empty.
    pub fn to_markdown(&self) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(pipe_row(&self.headers));
        lines.push(pipe_row(&vec!["---".to_string(); self.headers.len()]));
        for row in &self.rows {
            lines.push(pipe_row(row));
        }
        lines.join("\n")
    }
}

fn is_empty(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) if !dt.is_duration() => match dt.as_datetime() {
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        other => other.to_string(),
    }
}

fn pipe_row(cells: &[String]) -> String {
    let escaped: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
    format!("| {} |", escaped.join(" | "))
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
}
