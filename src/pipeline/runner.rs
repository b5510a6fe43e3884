//! Runs the cleaning pipeline end to end: load, clean, attach, derive,
//! aggregate, write.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::codes::{self, col};
use crate::loader::{load_dir, load_file};
use crate::output::{print_json, write_indexed_csv};
use crate::pipeline::aggregate::{
    block_summary, condition_summary, exclude_capped, log_accuracy_check,
};
use crate::pipeline::attach::attach_block_stats;
use crate::pipeline::clean::{keep_test_trials, normalize_missing, prune_columns};
use crate::pipeline::derive::{derive_trial_fields, select_final};
use crate::pipeline::types::RunReport;
use crate::table::Table;

/// Trial-level output file name.
pub const TRIALS_FILE: &str = "trials_clean.csv";
/// Block-summary output file name.
pub const BLOCKS_FILE: &str = "block_summary.csv";

/// Cleans every result file under `input_dir` and writes the trial-level
/// and block-summary tables into `output_dir`, overwriting previous runs.
///
/// Stages run strictly in sequence, each producing a new table. The
/// returned [`RunReport`] carries the written tables plus the
/// post-exclusion condition summary, which is logged but not written.
pub fn run(input_dir: &Path, output_dir: &Path) -> Result<RunReport> {
    let raw = load_dir(input_dir)?;
    info!(
        rows = raw.n_rows(),
        columns = raw.n_cols(),
        "input files combined"
    );

    let table = normalize_missing(raw);
    let table = prune_columns(table);
    let table = attach_block_stats(table)?;
    let table = keep_test_trials(table)?;
    let table = derive_trial_fields(table)?;
    let trials = select_final(&table)?;
    check_participant_count(&trials)?;

    std::fs::create_dir_all(output_dir)?;
    let trials_path = output_dir.join(TRIALS_FILE);
    write_indexed_csv(&trials_path, &trials)?;
    info!(path = %trials_path.display(), rows = trials.n_rows(), "trial-level table written");

    let blocks = block_summary(&trials)?;
    let blocks_path = output_dir.join(BLOCKS_FILE);
    write_indexed_csv(&blocks_path, &blocks)?;
    info!(path = %blocks_path.display(), rows = blocks.n_rows(), "block summary written");

    log_accuracy_check(&blocks)?;
    let kept = exclude_capped(&blocks)?;
    let conditions = condition_summary(&kept)?;
    print_json(&conditions)?;

    Ok(RunReport {
        trials,
        blocks,
        conditions,
    })
}

/// Reloads a written trial-level table and recomputes the block-level
/// sums from it, for checking a run's outputs without repeating it.
pub fn recheck_trials(trials_csv: &Path) -> Result<Table> {
    let reloaded = load_file(trials_csv)?;
    // drop the leading row-index column the writer added
    let reloaded = reloaded.retain_columns(|name| !name.is_empty());
    let reloaded = normalize_missing(reloaded);
    let blocks = block_summary(&reloaded)?;
    Ok(blocks)
}

fn check_participant_count(trials: &Table) -> Result<()> {
    let participant = trials.require_column(col::PARTICIPANT)?;
    let distinct: BTreeSet<_> = trials
        .rows
        .iter()
        .filter_map(|row| row[participant].clone())
        .collect();
    if distinct.len() != codes::EXPECTED_PARTICIPANTS {
        warn!(
            found = distinct.len(),
            expected = codes::EXPECTED_PARTICIPANTS,
            "participant count differs from the study plan"
        );
    } else {
        info!(participants = distinct.len(), "participant count checked");
    }
    Ok(())
}
