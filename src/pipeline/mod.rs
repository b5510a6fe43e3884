//! The cleaning pipeline, stage by stage.
//!
//! Each stage consumes the previous stage's table and produces a new one:
//! normalize, prune, attach per-block values, filter to real trials,
//! derive trial variables, select the output schema, then aggregate into
//! block and condition summaries.

pub mod aggregate;
pub mod attach;
pub mod clean;
pub mod derive;
pub mod runner;
pub mod types;
pub mod utility;
