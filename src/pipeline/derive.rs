//! Per-row derived variables and the final column selection.

use crate::codes::{self, col, out};
use crate::errors::CleanError;
use crate::pipeline::utility::{fmt_num, numeric};
use crate::table::{Cell, Table};

/// The trial-level output schema: (source column, output name), in order.
static FINAL_COLUMNS: &[(&str, &str)] = &[
    (col::PARTICIPANT, col::PARTICIPANT),
    (col::BLOCK, col::BLOCK),
    (out::BLOCK_ORDER, out::BLOCK_ORDER),
    (out::BLOCK_CODE, out::BLOCK_CODE),
    (col::AGE, col::AGE),
    (out::GENDER_FEMALE, out::GENDER_FEMALE),
    (col::STIM_LEFT, col::STIM_LEFT),
    (col::STIM_RIGHT, col::STIM_RIGHT),
    (col::RELATION, col::RELATION),
    (col::CORR_ANS, col::CORR_ANS),
    (col::TEST_KEYS, out::RESPONSE),
    (col::TEST_RT, out::RT),
    (out::CORRECT, out::CORRECT),
    (out::PRESSED_RIGHT, out::PRESSED_RIGHT),
    (out::CHOSE_TARGET, out::CHOSE_TARGET),
    (out::COMPOUND, out::COMPOUND),
    (out::ATTEMPTS, out::ATTEMPTS),
    (out::RATING_CONFIDENCE, out::RATING_CONFIDENCE),
    (out::RATING_DIFFICULTY, out::RATING_DIFFICULTY),
    (out::RATING_LIKING, out::RATING_LIKING),
    (col::SOURCE_FILE, col::SOURCE_FILE),
];

fn flag(hit: bool) -> Cell {
    Some(if hit { "1" } else { "0" }.to_string())
}

fn in_set(cell: &Cell, set: &[&str]) -> bool {
    matches!(cell.as_deref(), Some(v) if set.contains(&v))
}

/// Cell holding a 0-based index as text, shifted to 1-based.
fn one_based(cell: &Cell) -> Cell {
    numeric(cell).map(|v| fmt_num(v + 1.0))
}

/// Computes the derived trial variables and appends them as columns.
///
/// `correct` compares the response key textually against `corr_ans`; the
/// ambiguous blocks carry the no-answer sentinel there, which never
/// equals a key, so those trials score 0 without a special case. The
/// choice indicators are defined for ambiguous blocks only and are fixed
/// at 0 for coherent blocks.
pub fn derive_trial_fields(mut table: Table) -> Result<Table, CleanError> {
    let phase = table.require_column(col::PHASE_INDEX)?;
    let cond = table.require_column(col::COND_INDEX)?;
    let gender = table.require_column(col::GENDER)?;
    let keys = table.require_column(col::TEST_KEYS)?;
    let corr = table.require_column(col::CORR_ANS)?;
    let stim_right = table.require_column(col::STIM_RIGHT)?;
    let relation = table.require_column(col::RELATION)?;

    let n = table.n_rows();
    let mut block_order = Vec::with_capacity(n);
    let mut block_code = Vec::with_capacity(n);
    let mut gender_female = Vec::with_capacity(n);
    let mut correct = Vec::with_capacity(n);
    let mut pressed_right = Vec::with_capacity(n);
    let mut chose_target = Vec::with_capacity(n);
    let mut compound = Vec::with_capacity(n);

    for row in &table.rows {
        block_order.push(one_based(&row[phase]));

        let code = numeric(&row[cond]).map(|v| v + 1.0);
        block_code.push(code.map(fmt_num));
        let ambiguous = code.is_some_and(|c| codes::AMBIGUOUS_CODES.contains(&(c as i64)));

        gender_female.push(flag(row[gender].as_deref() == Some(codes::FEMALE_CODE)));

        let key = row[keys].as_deref();
        let hit = match (key, row[corr].as_deref()) {
            (Some(k), Some(a)) => k == a,
            _ => false,
        };
        correct.push(flag(hit));

        let right = key == Some(codes::RIGHT_KEY);
        let left = key == Some(codes::LEFT_KEY);
        pressed_right.push(flag(right));

        let target_stim = in_set(&row[stim_right], codes::TARGET_STIMS);
        let foil_stim = in_set(&row[stim_right], codes::FOIL_STIMS);
        let target_rel = in_set(&row[relation], codes::TARGET_RELATIONS);
        let foil_rel = in_set(&row[relation], codes::FOIL_RELATIONS);

        chose_target.push(flag(ambiguous && target_stim && right));

        // A response consistent with the untrained (derived) relation:
        // picking the matching set under its own cue, or rejecting it
        // under the opposite set's cue.
        let consistent = (target_stim && target_rel && right)
            || (foil_stim && foil_rel && right)
            || (target_stim && foil_rel && left)
            || (foil_stim && target_rel && left);
        compound.push(flag(ambiguous && consistent));
    }

    table.add_column(out::BLOCK_ORDER, block_order);
    table.add_column(out::BLOCK_CODE, block_code);
    table.add_column(out::GENDER_FEMALE, gender_female);
    table.add_column(out::CORRECT, correct);
    table.add_column(out::PRESSED_RIGHT, pressed_right);
    table.add_column(out::CHOSE_TARGET, chose_target);
    table.add_column(out::COMPOUND, compound);
    Ok(table)
}

/// Selects, renames, and reorders the trial-level output columns.
pub fn select_final(table: &Table) -> Result<Table, CleanError> {
    let sources: Vec<usize> = FINAL_COLUMNS
        .iter()
        .map(|(source, _)| table.require_column(source))
        .collect::<Result<_, _>>()?;

    let mut out = Table::new(
        FINAL_COLUMNS
            .iter()
            .map(|(_, name)| name.to_string())
            .collect(),
    );
    for row in &table.rows {
        out.rows.push(sources.iter().map(|&c| row[c].clone()).collect());
    }
    Ok(out)
}
