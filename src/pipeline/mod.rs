//! Pipeline entry points.
//!
//! - `diff`: delta between the current fetch and the previous snapshot
//! - `run`: the orchestrator sequencing fetch, extract, diff, notify, persist

pub mod diff;
pub mod run;

pub use diff::{Delta, detect};
pub use run::{NotifyOutcome, Orchestrator, RunOptions, RunReport, RunState};
