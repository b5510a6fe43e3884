//! Result types returned by the pipeline.

use serde::Serialize;

use crate::table::Table;

/// Per-(participant, block type) means across that type's blocks.
/// Missing means stay missing (`null` in the JSON log) rather than zero.
#[derive(Debug, Serialize)]
pub struct ConditionSummary {
    pub participant: String,
    pub block_type: String,
    pub block_attempts_this_block: Option<f64>,
    pub n_correct: Option<f64>,
    pub pct_correct: Option<f64>,
    pub n_pressed_right: Option<f64>,
    pub n_chose_target: Option<f64>,
    pub n_compound: Option<f64>,
    pub rating_confidence: Option<f64>,
    pub rating_difficulty: Option<f64>,
    pub rating_liking: Option<f64>,
}

/// Everything a pipeline run produced, kept inspectable for callers and
/// tests. The trial and block tables are also written to disk.
#[derive(Debug)]
pub struct RunReport {
    pub trials: Table,
    pub blocks: Table,
    pub conditions: Vec<ConditionSummary>,
}
