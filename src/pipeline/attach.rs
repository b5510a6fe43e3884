//! Per-block derived values joined back onto the main table: the attempt
//! count and the three post-block ratings.

use tracing::{info, warn};

use crate::codes::{col, out};
use crate::errors::CleanError;
use crate::pipeline::utility::{coerce_numeric, fmt_num, numeric};
use crate::table::{Cell, Table};

/// The join key shared by every per-block derivation.
const BLOCK_KEYS: [&str; 2] = [col::PARTICIPANT, col::BLOCK];

/// Groups `table` by `keys`, reduces `source` within each group, and
/// returns a small table of key columns plus the reduced `out_name`
/// column, ready to be joined back.
pub fn summarize<F>(
    table: &Table,
    keys: &[&str],
    source: &str,
    out_name: &str,
    reduce: F,
) -> Result<Table, CleanError>
where
    F: Fn(&[Cell]) -> Cell,
{
    let key_cols: Vec<usize> = keys
        .iter()
        .map(|k| table.require_column(k))
        .collect::<Result<_, _>>()?;
    let source_col = table.require_column(source)?;

    let mut columns: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    columns.push(out_name.to_string());
    let mut summary = Table::new(columns);

    for (key, rows) in table.group_rows(&key_cols) {
        let cells: Vec<Cell> = rows
            .iter()
            .map(|&r| table.rows[r][source_col].clone())
            .collect();
        let mut row = key;
        row.push(reduce(&cells));
        summary.rows.push(row);
    }
    Ok(summary)
}

/// Derives the per-block attempt count and the three block ratings, then
/// outer-joins each onto the main table on (participant, block).
pub fn attach_block_stats(table: Table) -> Result<Table, CleanError> {
    let attempts = summarize(&table, &BLOCK_KEYS, col::TRAIN_REP, out::ATTEMPTS, |cells| {
        // 0-based repetition index; the highest one seen plus one is the
        // 1-based number of attempts the block took.
        cells
            .iter()
            .filter_map(numeric)
            .reduce(f64::max)
            .map(|max| fmt_num(max + 1.0))
    })?;
    warn_missing_attempts(&attempts)?;

    let mut joined = table.outer_join(&attempts, &BLOCK_KEYS)?;
    info!(rows = joined.n_rows(), "attempt counts attached");

    let ratings = [
        (col::CONF_RATING, out::RATING_CONFIDENCE),
        (col::DIFF_RATING, out::RATING_DIFFICULTY),
        (col::LIKE_RATING, out::RATING_LIKING),
    ];
    for (source, out_name) in ratings {
        // Each block has at most one rating event, so summing the coerced
        // values yields that single rating, or 0 when the block has none.
        let rating = summarize(&joined, &BLOCK_KEYS, source, out_name, |cells| {
            let total: f64 = cells
                .iter()
                .filter_map(|c| coerce_numeric(c, source))
                .sum();
            Some(fmt_num(total))
        })?;
        joined = joined.outer_join(&rating, &BLOCK_KEYS)?;
    }
    info!(rows = joined.n_rows(), "block ratings attached");

    Ok(joined)
}

fn warn_missing_attempts(attempts: &Table) -> Result<(), CleanError> {
    let participant = attempts.require_column(col::PARTICIPANT)?;
    let block = attempts.require_column(col::BLOCK)?;
    let count = attempts.require_column(out::ATTEMPTS)?;
    for row in &attempts.rows {
        if row[count].is_none() {
            warn!(
                participant = row[participant].as_deref().unwrap_or(""),
                block = row[block].as_deref().unwrap_or(""),
                "block has no training repetition values, attempt count left missing"
            );
        }
    }
    Ok(())
}
