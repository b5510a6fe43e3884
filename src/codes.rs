//! Column names and coded values written by the experiment software.
//!
//! Every string the cleaning rules compare against lives here so the
//! mapping from software output to analysis variables stays auditable in
//! one place. The column names must match the result files verbatim.

/// Input column names, as they appear in the per-participant result files.
pub mod col {
    /// Added by the loader, not present in the source files.
    pub const SOURCE_FILE: &str = "source_file";

    pub const PARTICIPANT: &str = "participant";
    pub const BLOCK: &str = "block";
    /// Zero-based phase index of the block within the session.
    pub const PHASE_INDEX: &str = "blocks.thisN";
    /// Zero-based condition index (0-5) selecting the block's relation set.
    pub const COND_INDEX: &str = "blocks.thisIndex";
    /// Zero-based repetition index of the training loop.
    pub const TRAIN_REP: &str = "training_loops.thisRepN";
    /// Populated only on genuine test-trial rows.
    pub const TRIAL_INDEX: &str = "test_trials.thisN";

    pub const AGE: &str = "age";
    pub const GENDER: &str = "gender";

    pub const STIM_LEFT: &str = "stim_left";
    pub const STIM_RIGHT: &str = "stim_right";
    pub const RELATION: &str = "relation";
    pub const CORR_ANS: &str = "corr_ans";

    pub const TEST_KEYS: &str = "test_resp.keys";
    pub const TEST_RT: &str = "test_resp.rt";
    pub const TRAIN_KEYS: &str = "train_resp.keys";
    pub const TRAIN_RT: &str = "train_resp.rt";

    pub const CONF_RATING: &str = "conf_slider.response";
    pub const DIFF_RATING: &str = "diff_slider.response";
    pub const LIKE_RATING: &str = "like_slider.response";
}

/// Column names derived by the pipeline.
pub mod out {
    pub const BLOCK_ORDER: &str = "block_order";
    pub const BLOCK_CODE: &str = "block_code";
    pub const BLOCK_TYPE: &str = "block_type";
    pub const GENDER_FEMALE: &str = "gender_female";
    pub const RESPONSE: &str = "response";
    pub const RT: &str = "rt";
    pub const CORRECT: &str = "correct";
    pub const PRESSED_RIGHT: &str = "pressed_right";
    pub const CHOSE_TARGET: &str = "chose_target";
    pub const COMPOUND: &str = "compound_response";
    pub const ATTEMPTS: &str = "block_attempts_this_block";
    pub const RATING_CONFIDENCE: &str = "rating_confidence";
    pub const RATING_DIFFICULTY: &str = "rating_difficulty";
    pub const RATING_LIKING: &str = "rating_liking";
    pub const N_CORRECT: &str = "n_correct";
    pub const N_PRESSED_RIGHT: &str = "n_pressed_right";
    pub const N_CHOSE_TARGET: &str = "n_chose_target";
    pub const N_COMPOUND: &str = "n_compound";
    pub const PCT_CORRECT: &str = "pct_correct";
}

/// The software writes this literal token where a cell has no value.
pub const MISSING_TOKEN: &str = "None";

/// Response key for the right-hand stimulus.
pub const RIGHT_KEY: &str = "j";
/// Response key for the left-hand stimulus.
pub const LEFT_KEY: &str = "f";
/// `corr_ans` value on trials with no scored answer (ambiguous blocks).
pub const NO_CORRECT_ANSWER: &str = "none";
/// One-character gender code binarized to 1.
pub const FEMALE_CODE: &str = "f";

/// Ambiguous-condition target stimuli; choosing one of these on the right
/// counts toward `chose_target`.
pub static TARGET_STIMS: &[&str] = &["cug", "vek", "zid"];
/// The disjoint foil set paired against the targets.
pub static FOIL_STIMS: &[&str] = &["mip", "fas", "dax"];
/// Relation cues trained toward the target stimuli.
pub static TARGET_RELATIONS: &[&str] = &["~", "#", "%"];
/// Relation cues trained toward the foil stimuli.
pub static FOIL_RELATIONS: &[&str] = &["$", "&", "+"];

pub static AMBIGUOUS_CODES: &[i64] = &[1, 2, 3];
pub static COHERENT_CODES: &[i64] = &[4, 5, 6];

pub const AMBIGUOUS: &str = "ambiguous";
pub const COHERENT: &str = "coherent";

/// Block type for a 1-based block code, `None` outside 1-6.
pub fn block_type(block_code: i64) -> Option<&'static str> {
    if AMBIGUOUS_CODES.contains(&block_code) {
        Some(AMBIGUOUS)
    } else if COHERENT_CODES.contains(&block_code) {
        Some(COHERENT)
    } else {
        None
    }
}

/// Training-loop cap; a participant reaching it in any block is excluded.
pub const TRAINING_ATTEMPT_CAP: f64 = 10.0;
/// Test trials per block, the percent-correct denominator.
pub const TEST_TRIALS_PER_BLOCK: f64 = 16.0;
/// Participants the study recruited; deviations are logged, not fatal.
pub const EXPECTED_PARTICIPANTS: usize = 40;

/// Session-metadata columns the pruner removes outright.
pub static DROP_COLUMNS: &[&str] = &[
    "date",
    "expName",
    "psychopyVersion",
    "frameRate",
    "session",
    "instr_resp.keys",
    "instr_resp.rt",
    col::TRAIN_KEYS,
    col::TRAIN_RT,
];

/// Component timing columns, removed by suffix.
pub static DROP_SUFFIXES: &[&str] = &[".started", ".stopped"];
