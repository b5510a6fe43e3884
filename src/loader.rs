//! Reads per-participant result files into one combined table.

use std::fs;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use crate::codes::col;
use crate::errors::CleanError;
use crate::table::Table;

/// Loads every `*.csv` file in `input_dir` into one table.
///
/// Files are read in file-name order and concatenated with an outer union
/// of their columns: a column absent from a given file is missing for that
/// file's rows. Each row is tagged with its source file name.
///
/// # Errors
///
/// Returns [`CleanError::InputDir`] when the directory cannot be read and
/// [`CleanError::NoInputFiles`] when it contains no `.csv` files.
pub fn load_dir(input_dir: &Path) -> Result<Table, CleanError> {
    let entries = fs::read_dir(input_dir).map_err(|source| CleanError::InputDir {
        path: input_dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CleanError::InputDir {
            path: input_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(CleanError::NoInputFiles {
            path: input_dir.to_path_buf(),
        });
    }

    let mut table = Table::new(vec![col::SOURCE_FILE.to_string()]);
    for path in &files {
        append_csv(&mut table, path, true)?;
    }
    Ok(table)
}

/// Loads a single CSV file into a table, without source tagging.
pub fn load_file(path: &Path) -> Result<Table, CleanError> {
    let mut table = Table::default();
    append_csv(&mut table, path, false)?;
    Ok(table)
}

fn append_csv(table: &mut Table, path: &Path, tag_source: bool) -> Result<(), CleanError> {
    let csv_err = |source| CleanError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    let cols: Vec<usize> = headers.iter().map(|h| table.ensure_column(h)).collect();
    let source_col = tag_source.then(|| table.ensure_column(col::SOURCE_FILE));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut count = 0usize;
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let mut row: Vec<_> = vec![None; table.n_cols()];
        for (i, field) in record.iter().enumerate() {
            match cols.get(i) {
                Some(&c) => row[c] = Some(field.to_string()),
                None => {
                    debug!(path = %path.display(), "record wider than header, extra fields dropped");
                    break;
                }
            }
        }
        if let Some(c) = source_col {
            row[c] = Some(file_name.clone());
        }
        table.rows.push(row);
        count += 1;
    }

    debug!(path = %path.display(), rows = count, "file loaded");
    Ok(())
}
