//! Fatal error taxonomy for the cleaning pipeline.
//!
//! Only conditions that invalidate the whole run are errors; per-cell
//! problems (failed numeric coercion, a block with no repetition values)
//! are logged as warnings and the cell becomes missing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanError {
    /// The input directory is missing or unreadable.
    #[error("cannot read input directory {}: {source}", path.display())]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input directory contains no result files at all.
    #[error("no .csv files found in {}", path.display())]
    NoInputFiles { path: PathBuf },

    /// A result file could not be read or parsed as CSV.
    #[error("failed reading {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A column the pipeline depends on is absent from every input file.
    #[error("required column `{column}` is missing from the combined table")]
    MissingColumn { column: String },
}
