// src/extract/mod.rs
//
// Reads a worksheet into an in-memory table of typed cells and provides the
// row-level operations the pipeline needs: group filtering, column
// projection, and lossy numeric coercion.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDate;
use tracing::debug;

use crate::error::SourceFormatError;

/// A single spreadsheet cell value.
///
/// Modeled as a closed union so every consumer handles all shapes a source
/// export can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    /// Stringify the cell. Dates render as `YYYY-MM-DD`; empty cells render
    /// as the empty string.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// Numeric coercion with a zero default. Non-numeric text, empty cells
    /// and dates all coerce to `0.0`; this never fails.
    pub fn as_f64_or_zero(&self) -> f64 {
        match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse().unwrap_or(0.0),
            Cell::Date(_) | Cell::Empty => 0.0,
        }
    }

    /// True for cells that carry no value: `Empty`, or text that trims to
    /// nothing.
    pub fn is_absent(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Where to find the header row inside a workbook.
#[derive(Debug, Clone, Default)]
pub struct SheetOptions {
    /// Sheet to read; the first sheet when `None`.
    pub sheet_name: Option<String>,
    /// Number of rows to skip before the header row.
    pub header_offset: usize,
}

/// Header names plus data rows, each row aligned to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Borrowed view of one table row with access by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.cells.get(i))
    }

    /// Stringified cell value, or the empty string for absent columns.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(Cell::as_text).unwrap_or_default()
    }
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            headers: &self.headers,
            cells,
        })
    }

    /// Keep only rows whose `column` cell contains `needle`, matched
    /// case-insensitively on the trimmed text. Rows with an empty grouping
    /// cell never match, and a missing grouping column selects nothing.
    pub fn filter_contains(&self, column: &str, needle: &str) -> Table {
        let needle = needle.to_lowercase();
        let Some(idx) = self.column_index(column) else {
            debug!(column, "grouping column missing from source; nothing selected");
            return Table {
                headers: self.headers.clone(),
                rows: Vec::new(),
            };
        };
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                row.get(idx)
                    .map(|cell| cell.as_text().trim().to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        Table {
            headers: self.headers.clone(),
            rows,
        }
    }

    /// Project to `columns`, in the given order. Columns absent from the
    /// source are silently omitted.
    pub fn project(&self, columns: &[&str]) -> Table {
        let indices: Vec<usize> = columns
            .iter()
            .filter_map(|c| self.column_index(c))
            .collect();
        let headers = indices.iter().map(|&i| self.headers[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();
        Table { headers, rows }
    }

    /// Trim surrounding whitespace from the text cells of the named
    /// columns, in place. Non-text cells and absent columns are left alone.
    pub fn trim_text(&mut self, columns: &[&str]) {
        for name in columns {
            let Some(idx) = self.column_index(name) else {
                continue;
            };
            for row in &mut self.rows {
                if let Some(Cell::Text(s)) = row.get_mut(idx) {
                    *s = s.trim().to_string();
                }
            }
        }
    }

    /// Replace every cell of the named columns with its zero-defaulted
    /// numeric value, in place. Columns absent from the table are skipped.
    pub fn coerce_numeric(&mut self, columns: &[&str]) {
        for name in columns {
            let Some(idx) = self.column_index(name) else {
                continue;
            };
            for row in &mut self.rows {
                if let Some(cell) = row.get_mut(idx) {
                    *cell = Cell::Number(cell.as_f64_or_zero());
                }
            }
        }
    }
}

/// Load one worksheet into a [`Table`].
///
/// The only fatal failures are at the workbook level: missing file, corrupt
/// archive, missing sheet. A sheet with no rows past the header offset
/// yields an empty table.
pub fn read_sheet(path: &Path, options: &SheetOptions) -> Result<Table, SourceFormatError> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|source| SourceFormatError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let sheet = match &options.sheet_name {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(SourceFormatError::SheetNotFound {
                    name: name.clone(),
                    path: path.to_path_buf(),
                });
            }
            name.clone()
        }
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SourceFormatError::NoSheets {
                path: path.to_path_buf(),
            })?,
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|source| SourceFormatError::Read {
            name: sheet.clone(),
            path: path.to_path_buf(),
            source,
        })?;

    let mut row_iter = range.rows().skip(options.header_offset);
    let Some(header_row) = row_iter.next() else {
        return Ok(Table::default());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    let width = headers.len();

    let rows: Vec<Vec<Cell>> = row_iter
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().map(convert_cell).collect();
            // Align ragged rows to the header width.
            cells.resize(width, Cell::Empty);
            cells
        })
        .collect();

    debug!(sheet = %sheet, rows = rows.len(), columns = width, "read worksheet");
    Ok(Table { headers, rows })
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|naive| Cell::Date(naive.date()))
            .unwrap_or(Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, name: &str, rows: &[&[&str]]) -> Result<std::path::PathBuf> {
        let path = dir.path().join(name);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, *value)?;
            }
        }
        workbook.save(&path)?;
        Ok(path)
    }

    #[test]
    fn missing_file_is_a_source_format_error() {
        let err = read_sheet(Path::new("no_such_report.xlsx"), &SheetOptions::default())
            .unwrap_err();
        assert!(matches!(err, SourceFormatError::Open { .. }));
    }

    #[test]
    fn missing_sheet_is_a_source_format_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_fixture(&dir, "one.xlsx", &[&["A"], &["1"]])?;
        let options = SheetOptions {
            sheet_name: Some("Agents".into()),
            header_offset: 0,
        };
        let err = read_sheet(&path, &options).unwrap_err();
        assert!(matches!(err, SourceFormatError::SheetNotFound { .. }));
        Ok(())
    }

    #[test]
    fn header_offset_skips_preamble_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_fixture(
            &dir,
            "master.xlsx",
            &[
                &["Master Listing"],
                &["generated 2026-02-01"],
                &["NAME", "AGENT CODE"],
                &["Jane Doe", "A100"],
            ],
        )?;
        let options = SheetOptions {
            sheet_name: None,
            header_offset: 2,
        };
        let table = read_sheet(&path, &options)?;
        assert_eq!(table.headers, vec!["NAME", "AGENT CODE"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.iter().next().unwrap().text("AGENT CODE"), "A100");
        Ok(())
    }

    #[test]
    fn filter_contains_is_case_insensitive_and_skips_blanks() {
        let table = Table {
            headers: vec!["GAM_NAME".into(), "PROPOSALNO".into()],
            rows: vec![
                vec![Cell::Text(" superachiever east ".into()), Cell::Text("P1".into())],
                vec![Cell::Text("Other Team".into()), Cell::Text("P2".into())],
                vec![Cell::Empty, Cell::Text("P3".into())],
            ],
        };
        let filtered = table.filter_contains("GAM_NAME", "SuperAchiever");
        assert_eq!(filtered.rows.len(), 1);
        assert_eq!(filtered.iter().next().unwrap().text("PROPOSALNO"), "P1");

        // Missing grouping column selects nothing rather than erroring.
        assert!(table.filter_contains("TEAM", "SuperAchiever").is_empty());
    }

    #[test]
    fn project_keeps_order_and_omits_missing_columns() {
        let table = Table {
            headers: vec!["B".into(), "A".into(), "C".into()],
            rows: vec![vec![
                Cell::Text("b".into()),
                Cell::Text("a".into()),
                Cell::Text("c".into()),
            ]],
        };
        let projected = table.project(&["A", "MISSING", "B"]);
        assert_eq!(projected.headers, vec!["A", "B"]);
        assert_eq!(
            projected.rows,
            vec![vec![Cell::Text("a".into()), Cell::Text("b".into())]]
        );
    }

    #[test]
    fn trim_text_cleans_named_columns_only() {
        let mut table = Table {
            headers: vec!["PROPOSALNO".into(), "AGENT_NAME".into()],
            rows: vec![
                vec![Cell::Text(" P1 ".into()), Cell::Text(" Jane Doe ".into())],
                vec![Cell::Number(7.0), Cell::Empty],
            ],
        };
        table.trim_text(&["PROPOSALNO", "MISSING"]);
        assert_eq!(table.rows[0][0], Cell::Text("P1".into()));
        // Untargeted columns and non-text cells are untouched.
        assert_eq!(table.rows[0][1], Cell::Text(" Jane Doe ".into()));
        assert_eq!(table.rows[1][0], Cell::Number(7.0));
    }

    #[test]
    fn coerce_numeric_defaults_garbage_to_zero() {
        let mut table = Table {
            headers: vec!["AFYC".into(), "AGENT_NAME".into()],
            rows: vec![
                vec![Cell::Text("1500".into()), Cell::Text("Jane".into())],
                vec![Cell::Text("N/A".into()), Cell::Text("John".into())],
                vec![Cell::Empty, Cell::Text("Mary".into())],
            ],
        };
        table.coerce_numeric(&["AFYC", "TOTAL_EXPECTED_DUE"]);
        assert_eq!(table.rows[0][0], Cell::Number(1500.0));
        assert_eq!(table.rows[1][0], Cell::Number(0.0));
        assert_eq!(table.rows[2][0], Cell::Number(0.0));
        // Non-numeric columns are untouched.
        assert_eq!(table.rows[0][1], Cell::Text("Jane".into()));
    }

    #[test]
    fn cell_text_rendering() {
        assert_eq!(Cell::Number(12345.0).as_text(), "12345");
        assert_eq!(Cell::Number(0.5).as_text(), "0.5");
        assert_eq!(
            Cell::Date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()).as_text(),
            "2026-01-05"
        );
        assert_eq!(Cell::Empty.as_text(), "");
    }
}
