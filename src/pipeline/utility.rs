//! Numeric helpers shared by the attach and aggregation stages.

use tracing::warn;

use crate::table::Cell;

/// Parses a cell as a number, quietly treating unparseable text as missing.
pub fn numeric(cell: &Cell) -> Option<f64> {
    cell.as_deref().and_then(|s| s.trim().parse::<f64>().ok())
}

/// Parses a cell as a number; a present-but-unparseable value is logged
/// and becomes missing, and processing continues.
pub fn coerce_numeric(cell: &Cell, column: &str) -> Option<f64> {
    let raw = cell.as_deref()?;
    match raw.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(column, value = raw, "numeric coercion failed, treating as missing");
            None
        }
    }
}

/// Mean of the present values; `None` when every value is missing.
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.iter().flatten() {
        sum += v;
        n += 1;
    }
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// Sum of the present values; 0.0 when every value is missing.
pub fn sum_present(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().sum()
}

/// Formats a number the way the downstream statistics environment prints
/// it: integral values without a decimal point, everything else via the
/// shortest round-trip representation.
pub fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}
