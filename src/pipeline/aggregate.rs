//! Grouped reductions: block summaries, the participant accuracy check,
//! the training-cap exclusion, and the per-condition means.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::codes::{self, col, out};
use crate::errors::CleanError;
use crate::pipeline::types::ConditionSummary;
use crate::pipeline::utility::{fmt_num, mean_present, numeric, sum_present};
use crate::table::{Cell, Table};

fn mean_cell(values: &[Option<f64>]) -> Cell {
    mean_present(values).map(fmt_num)
}

/// One row per (participant, block): averaged demographics (constant
/// within a block), summed trial flags, percent correct, and the block
/// ratings.
pub fn block_summary(trials: &Table) -> Result<Table, CleanError> {
    let participant = trials.require_column(col::PARTICIPANT)?;
    let block = trials.require_column(col::BLOCK)?;
    let code = trials.require_column(out::BLOCK_CODE)?;
    let age = trials.require_column(col::AGE)?;
    let gender = trials.require_column(out::GENDER_FEMALE)?;
    let attempts = trials.require_column(out::ATTEMPTS)?;
    let correct = trials.require_column(out::CORRECT)?;
    let pressed = trials.require_column(out::PRESSED_RIGHT)?;
    let chose = trials.require_column(out::CHOSE_TARGET)?;
    let compound = trials.require_column(out::COMPOUND)?;
    let conf = trials.require_column(out::RATING_CONFIDENCE)?;
    let diff = trials.require_column(out::RATING_DIFFICULTY)?;
    let like = trials.require_column(out::RATING_LIKING)?;

    let mut summary = Table::new(vec![
        col::PARTICIPANT.into(),
        col::BLOCK.into(),
        out::BLOCK_CODE.into(),
        out::BLOCK_TYPE.into(),
        col::AGE.into(),
        out::GENDER_FEMALE.into(),
        out::ATTEMPTS.into(),
        out::N_CORRECT.into(),
        out::N_PRESSED_RIGHT.into(),
        out::N_CHOSE_TARGET.into(),
        out::N_COMPOUND.into(),
        out::PCT_CORRECT.into(),
        out::RATING_CONFIDENCE.into(),
        out::RATING_DIFFICULTY.into(),
        out::RATING_LIKING.into(),
    ]);

    for (key, rows) in trials.group_rows(&[participant, block]) {
        let nums = |c: usize| -> Vec<Option<f64>> {
            rows.iter().map(|&r| numeric(&trials.rows[r][c])).collect()
        };
        let first = |c: usize| -> Cell {
            rows.iter().find_map(|&r| trials.rows[r][c].clone())
        };

        let code_cell = first(code);
        let block_type = numeric(&code_cell)
            .and_then(|c| codes::block_type(c as i64))
            .map(str::to_string);
        let n_correct = sum_present(&nums(correct));

        let mut row = key;
        row.push(code_cell);
        row.push(block_type);
        row.push(mean_cell(&nums(age)));
        row.push(mean_cell(&nums(gender)));
        row.push(mean_cell(&nums(attempts)));
        row.push(Some(fmt_num(n_correct)));
        row.push(Some(fmt_num(sum_present(&nums(pressed)))));
        row.push(Some(fmt_num(sum_present(&nums(chose)))));
        row.push(Some(fmt_num(sum_present(&nums(compound)))));
        row.push(Some(fmt_num(
            n_correct / codes::TEST_TRIALS_PER_BLOCK * 100.0,
        )));
        row.push(mean_cell(&nums(conf)));
        row.push(mean_cell(&nums(diff)));
        row.push(mean_cell(&nums(like)));
        summary.rows.push(row);
    }

    info!(blocks = summary.n_rows(), "block summary built");
    Ok(summary)
}

/// Logs each participant's mean block accuracy and the distribution of
/// those means, the quick sanity look the analysis starts from.
pub fn log_accuracy_check(blocks: &Table) -> Result<(), CleanError> {
    let participant = blocks.require_column(col::PARTICIPANT)?;
    let n_correct = blocks.require_column(out::N_CORRECT)?;

    let mut histogram: BTreeMap<i64, usize> = BTreeMap::new();
    for (key, rows) in blocks.group_rows(&[participant]) {
        let sums: Vec<Option<f64>> = rows
            .iter()
            .map(|&r| numeric(&blocks.rows[r][n_correct]))
            .collect();
        if let Some(mean) = mean_present(&sums) {
            info!(
                participant = key[0].as_deref().unwrap_or(""),
                mean_correct = mean,
                "participant accuracy"
            );
            *histogram.entry(mean.round() as i64).or_default() += 1;
        }
    }
    for (mean_correct, participants) in histogram {
        info!(mean_correct, participants, "accuracy distribution");
    }
    Ok(())
}

/// Removes every row of any participant who hit the training-loop cap in
/// any block. Exclusion is all-or-nothing per participant.
pub fn exclude_capped(blocks: &Table) -> Result<Table, CleanError> {
    let participant = blocks.require_column(col::PARTICIPANT)?;
    let attempts = blocks.require_column(out::ATTEMPTS)?;

    let mut capped: BTreeSet<Cell> = BTreeSet::new();
    for row in &blocks.rows {
        if numeric(&row[attempts]) == Some(codes::TRAINING_ATTEMPT_CAP) {
            capped.insert(row[participant].clone());
        }
    }
    for p in &capped {
        warn!(
            participant = p.as_deref().unwrap_or(""),
            "participant hit the training attempt cap, removing all rows"
        );
    }

    let kept = blocks.retain_rows(|row| !capped.contains(&row[participant]));
    info!(
        before = blocks.n_rows(),
        after = kept.n_rows(),
        excluded_participants = capped.len(),
        "training-cap exclusion applied"
    );
    Ok(kept)
}

/// Means of every numeric outcome across the (at most three) blocks of
/// each type, per participant.
pub fn condition_summary(blocks: &Table) -> Result<Vec<ConditionSummary>, CleanError> {
    let participant = blocks.require_column(col::PARTICIPANT)?;
    let block_type = blocks.require_column(out::BLOCK_TYPE)?;
    let attempts = blocks.require_column(out::ATTEMPTS)?;
    let n_correct = blocks.require_column(out::N_CORRECT)?;
    let pct = blocks.require_column(out::PCT_CORRECT)?;
    let pressed = blocks.require_column(out::N_PRESSED_RIGHT)?;
    let chose = blocks.require_column(out::N_CHOSE_TARGET)?;
    let compound = blocks.require_column(out::N_COMPOUND)?;
    let conf = blocks.require_column(out::RATING_CONFIDENCE)?;
    let diff = blocks.require_column(out::RATING_DIFFICULTY)?;
    let like = blocks.require_column(out::RATING_LIKING)?;

    let mut summaries = Vec::new();
    for (key, rows) in blocks.group_rows(&[participant, block_type]) {
        let Some(block_type) = key[1].clone() else {
            warn!(
                participant = key[0].as_deref().unwrap_or(""),
                "blocks without a recognized type skipped in condition summary"
            );
            continue;
        };
        let mean_of = |c: usize| -> Option<f64> {
            let values: Vec<Option<f64>> = rows
                .iter()
                .map(|&r| numeric(&blocks.rows[r][c]))
                .collect();
            mean_present(&values)
        };

        summaries.push(ConditionSummary {
            participant: key[0].clone().unwrap_or_default(),
            block_type,
            block_attempts_this_block: mean_of(attempts),
            n_correct: mean_of(n_correct),
            pct_correct: mean_of(pct),
            n_pressed_right: mean_of(pressed),
            n_chose_target: mean_of(chose),
            n_compound: mean_of(compound),
            rating_confidence: mean_of(conf),
            rating_difficulty: mean_of(diff),
            rating_liking: mean_of(like),
        });
    }

    info!(rows = summaries.len(), "condition summary built");
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Cell {
        Some(s.to_string())
    }

    /// Trial-level table in the final output schema, two participants,
    /// one ambiguous block each, plus a second block for participant 1.
    fn trials() -> Table {
        let columns = vec![
            col::PARTICIPANT.into(),
            col::BLOCK.into(),
            out::BLOCK_CODE.into(),
            col::AGE.into(),
            out::GENDER_FEMALE.into(),
            out::ATTEMPTS.into(),
            out::CORRECT.into(),
            out::PRESSED_RIGHT.into(),
            out::CHOSE_TARGET.into(),
            out::COMPOUND.into(),
            out::RATING_CONFIDENCE.into(),
            out::RATING_DIFFICULTY.into(),
            out::RATING_LIKING.into(),
        ];
        let mut t = Table::new(columns);
        let mut push = |p: &str, b: &str, code: &str, att: &str, cor: &str, right: &str, chose: &str| {
            t.rows.push(vec![
                cell(p),
                cell(b),
                cell(code),
                cell("23"),
                cell("1"),
                cell(att),
                cell(cor),
                cell(right),
                cell(chose),
                cell("0"),
                cell("5"),
                cell("3"),
                cell("4"),
            ]);
        };
        push("1", "1", "1", "2", "0", "1", "1");
        push("1", "1", "1", "2", "0", "0", "0");
        push("1", "2", "4", "1", "1", "1", "0");
        push("1", "2", "4", "1", "1", "0", "0");
        push("2", "1", "1", "10", "0", "1", "1");
        t
    }

    fn row_for<'a>(t: &'a Table, participant: &str, block: &str) -> &'a Vec<Cell> {
        let p = t.column_index(col::PARTICIPANT).unwrap();
        let b = t.column_index(col::BLOCK).unwrap();
        t.rows
            .iter()
            .find(|r| r[p].as_deref() == Some(participant) && r[b].as_deref() == Some(block))
            .unwrap()
    }

    #[test]
    fn test_block_summary_sums_and_means() {
        let blocks = block_summary(&trials()).unwrap();
        assert_eq!(blocks.n_rows(), 3);

        let row = row_for(&blocks, "1", "1");
        let idx = |name: &str| blocks.column_index(name).unwrap();
        assert_eq!(row[idx(out::BLOCK_TYPE)], cell("ambiguous"));
        assert_eq!(row[idx(col::AGE)], cell("23"));
        assert_eq!(row[idx(out::ATTEMPTS)], cell("2"));
        assert_eq!(row[idx(out::N_CORRECT)], cell("0"));
        assert_eq!(row[idx(out::N_PRESSED_RIGHT)], cell("1"));
        assert_eq!(row[idx(out::N_CHOSE_TARGET)], cell("1"));
        assert_eq!(row[idx(out::PCT_CORRECT)], cell("0"));
        assert_eq!(row[idx(out::RATING_CONFIDENCE)], cell("5"));

        let row = row_for(&blocks, "1", "2");
        assert_eq!(row[idx(out::BLOCK_TYPE)], cell("coherent"));
        assert_eq!(row[idx(out::N_CORRECT)], cell("2"));
        assert_eq!(row[idx(out::PCT_CORRECT)], cell("12.5"));
    }

    #[test]
    fn test_exclusion_is_all_or_nothing() {
        let blocks = block_summary(&trials()).unwrap();
        let kept = exclude_capped(&blocks).unwrap();

        let p = kept.column_index(col::PARTICIPANT).unwrap();
        // participant 2 hit the cap and loses every row
        assert!(kept.rows.iter().all(|r| r[p].as_deref() != Some("2")));
        // participant 1 keeps both blocks
        assert_eq!(kept.n_rows(), 2);
    }

    #[test]
    fn test_exclusion_keeps_everyone_below_cap() {
        let mut blocks = block_summary(&trials()).unwrap();
        let a = blocks.column_index(out::ATTEMPTS).unwrap();
        for row in &mut blocks.rows {
            row[a] = cell("9");
        }
        let kept = exclude_capped(&blocks).unwrap();
        assert_eq!(kept.n_rows(), blocks.n_rows());
    }

    #[test]
    fn test_condition_summary_means_within_type() {
        let blocks = block_summary(&trials()).unwrap();
        let summaries = condition_summary(&blocks).unwrap();

        let p1_amb = summaries
            .iter()
            .find(|s| s.participant == "1" && s.block_type == codes::AMBIGUOUS)
            .unwrap();
        assert_eq!(p1_amb.n_correct, Some(0.0));
        assert_eq!(p1_amb.block_attempts_this_block, Some(2.0));
        assert_eq!(p1_amb.n_chose_target, Some(1.0));

        let p1_coh = summaries
            .iter()
            .find(|s| s.participant == "1" && s.block_type == codes::COHERENT)
            .unwrap();
        assert_eq!(p1_coh.n_correct, Some(2.0));
        assert_eq!(p1_coh.pct_correct, Some(12.5));
    }

    #[test]
    fn test_log_accuracy_check_does_not_panic() {
        let blocks = block_summary(&trials()).unwrap();
        log_accuracy_check(&blocks).unwrap();
    }
}
