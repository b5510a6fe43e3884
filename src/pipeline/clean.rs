//! Structural cleanup: missing-value canonicalization, metadata-column
//! pruning, and the trial-row filter.

use tracing::{debug, info};

use crate::codes::{self, col};
use crate::errors::CleanError;
use crate::table::Table;

/// Canonicalizes the software's two missing-value spellings. The empty
/// string and the literal placeholder token both become the missing cell.
/// Must run before any reducer that ignores missing values.
pub fn normalize_missing(mut table: Table) -> Table {
    let mut cleared = 0usize;
    for row in &mut table.rows {
        for cell in row.iter_mut() {
            if let Some(s) = cell {
                if s.is_empty() || s == codes::MISSING_TOKEN {
                    *cell = None;
                    cleared += 1;
                }
            }
        }
    }
    debug!(cleared, "canonicalized missing cells");
    table
}

/// Drops session-metadata columns: the fixed name list plus every
/// component timing column matched by suffix.
pub fn prune_columns(table: Table) -> Table {
    let before = table.n_cols();
    let pruned = table.retain_columns(|name| {
        !codes::DROP_COLUMNS.contains(&name)
            && !codes::DROP_SUFFIXES.iter().any(|s| name.ends_with(s))
    });
    info!(before, after = pruned.n_cols(), "pruned metadata columns");
    pruned
}

/// Keeps only rows with a trial-tracking value. Rating events and the
/// block-transition rows the software emits between phases lack it, so
/// this collapses the joined table back to one row per real test trial.
pub fn keep_test_trials(table: Table) -> Result<Table, CleanError> {
    let idx = table.require_column(col::TRIAL_INDEX)?;
    let before = table.n_rows();
    let kept = table.retain_rows(|row| row[idx].is_some());
    info!(before, after = kept.n_rows(), "dropped non-trial rows");
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn cell(s: &str) -> Cell {
        Some(s.to_string())
    }

    #[test]
    fn test_normalize_missing_both_spellings() {
        let mut t = Table::new(vec!["a".into(), "b".into()]);
        t.rows.push(vec![cell(""), cell("None")]);
        t.rows.push(vec![cell("None of the above"), cell("0")]);

        let t = normalize_missing(t);
        assert_eq!(t.rows[0], vec![None, None]);
        // only the exact token is a placeholder
        assert_eq!(t.rows[1][0], cell("None of the above"));
        assert_eq!(t.rows[1][1], cell("0"));
    }

    #[test]
    fn test_prune_columns_names_and_suffixes() {
        let mut t = Table::new(vec![
            "participant".into(),
            "psychopyVersion".into(),
            "fixation.started".into(),
            "test_resp.rt".into(),
        ]);
        t.rows.push(vec![cell("1"), cell("2023.2.3"), cell("10.1"), cell("0.5")]);

        let t = prune_columns(t);
        assert_eq!(
            t.columns,
            vec!["participant".to_string(), "test_resp.rt".to_string()]
        );
    }

    #[test]
    fn test_keep_test_trials() {
        let mut t = Table::new(vec!["participant".into(), col::TRIAL_INDEX.into()]);
        t.rows.push(vec![cell("1"), cell("0")]);
        t.rows.push(vec![cell("1"), None]);
        t.rows.push(vec![cell("1"), cell("1")]);

        let t = keep_test_trials(t).unwrap();
        assert_eq!(t.n_rows(), 2);
        let idx = t.column_index(col::TRIAL_INDEX).unwrap();
        // every surviving row carries a trial-tracking value
        assert!(t.rows.iter().all(|row| row[idx].is_some()));
    }

    #[test]
    fn test_keep_test_trials_requires_column() {
        let t = Table::new(vec!["participant".into()]);
        assert!(matches!(
            keep_test_trials(t),
            Err(CleanError::MissingColumn { .. })
        ));
    }
}
