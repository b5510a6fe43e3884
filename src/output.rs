//! Output formatting and persistence for cleaned tables.
//!
//! Supports CSV writing with a leading row-index column and JSON
//! pretty-printing of summary values.

use std::io;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::table::Table;

/// Writes `table` to `path` as CSV, overwriting any previous run.
///
/// The first column has an empty header and carries the 1-based row
/// number, matching the row-naming convention of the statistics
/// environment the outputs are diffed against. Missing cells are written
/// as empty fields.
pub fn write_indexed_csv(path: &Path, table: &Table) -> Result<()> {
    debug!(path = %path.display(), rows = table.n_rows(), "writing CSV");
    let mut writer = WriterBuilder::new().from_path(path)?;
    write_indexed(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

/// Writes `table` to stdout in the same indexed-CSV shape.
pub fn print_indexed_csv(table: &Table) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(io::stdout());
    write_indexed(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}

fn write_indexed<W: io::Write>(writer: &mut csv::Writer<W>, table: &Table) -> Result<()> {
    let mut header = Vec::with_capacity(table.n_cols() + 1);
    header.push("");
    header.extend(table.columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for (i, row) in table.rows.iter().enumerate() {
        let index = (i + 1).to_string();
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(index.as_str());
        record.extend(row.iter().map(|cell| cell.as_deref().unwrap_or("")));
        writer.write_record(&record)?;
    }
    Ok(())
}

/// Logs a summary value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn sample() -> Table {
        let mut t = Table::new(vec!["participant".into(), "rt".into()]);
        t.rows.push(vec![cell("1"), cell("0.5")]);
        t.rows.push(vec![cell("2"), None]);
        t
    }

    #[test]
    fn test_write_indexed_csv_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_indexed_csv(&path, &sample()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], ",participant,rt");
        assert_eq!(lines[1], "1,1,0.5");
        // missing cell becomes an empty field
        assert_eq!(lines[2], "2,2,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_indexed_csv_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_indexed_csv(&path, &sample()).unwrap();

        let mut shorter = sample();
        shorter.rows.truncate(1);
        write_indexed_csv(&path, &shorter).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        #[derive(Serialize)]
        struct S {
            v: u8,
        }
        print_json(&S { v: 1 }).unwrap();
    }
}
