// src/archive/mod.rs
//
// Daily snapshot of the cleaned record set. Runs regardless of how the
// remote sync went; the snapshot is the operator's copy of what the run
// saw, not of what the remote accepted.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::extract::{Cell, Table};

/// `Daily_Submissions_<YYYYMMDD>_<HHMM>.xlsx`. Minute resolution; a second
/// run in the same minute overwrites the first.
pub fn snapshot_filename(now: DateTime<Local>) -> String {
    format!("Daily_Submissions_{}.xlsx", now.format("%Y%m%d_%H%M"))
}

/// Write the table to a timestamped workbook under `out_dir`, creating the
/// directory if needed. Returns the path written.
pub fn write_snapshot(table: &Table, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating archive directory {}", out_dir.display()))?;
    let path = out_dir.join(snapshot_filename(Local::now()));
    write_workbook(table, &path)?;
    info!(path = %path.display(), rows = table.rows.len(), "wrote daily snapshot");
    Ok(path)
}

fn write_workbook(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                Cell::Date(d) => {
                    sheet.write_string(r, c, &d.format("%Y-%m-%d").to_string())?;
                }
                Cell::Empty => {}
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("saving snapshot {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    use crate::extract::{read_sheet, SheetOptions};

    #[test]
    fn filename_encodes_date_and_minute() {
        let when = Local.with_ymd_and_hms(2026, 2, 3, 9, 7, 59).unwrap();
        assert_eq!(snapshot_filename(when), "Daily_Submissions_20260203_0907.xlsx");
    }

    #[test]
    fn snapshot_round_trips_through_the_extractor() -> anyhow::Result<()> {
        let table = Table {
            headers: vec!["PROPOSALNO".into(), "AFYC".into()],
            rows: vec![
                vec![Cell::Text("P1".into()), Cell::Number(1500.0)],
                vec![Cell::Text("P2".into()), Cell::Number(0.0)],
            ],
        };

        let dir = TempDir::new()?;
        let path = write_snapshot(&table, dir.path())?;
        assert!(path.is_file());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Daily_Submissions_"));

        let read_back = read_sheet(&path, &SheetOptions::default())?;
        assert_eq!(read_back.headers, table.headers);
        assert_eq!(read_back.rows.len(), 2);
        assert_eq!(read_back.rows[0][1], Cell::Number(1500.0));
        Ok(())
    }

    #[test]
    fn creates_the_archive_directory() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let nested = dir.path().join("data").join("daily_submissions");
        let table = Table {
            headers: vec!["PROPOSALNO".into()],
            rows: vec![],
        };
        let path = write_snapshot(&table, &nested)?;
        assert!(path.starts_with(&nested));
        assert!(path.is_file());
        Ok(())
    }
}
