// src/lib.rs

//! Per-day, per-file code churn from version control history.
//!
//! Changesets are fed in history order into a [`ChangesetProcessor`], which
//! follows file renames, classifies bug fixes and accumulates one
//! [`DailyCodeChurn`] per file and day. Measures are derived afterwards from
//! the finished records through the aggregators in [`measures`].

pub mod analyzer;
pub mod bugs;
pub mod measures;
pub mod model;
pub mod output;
pub mod processor;
pub mod renames;
pub mod report;

pub use bugs::{BugClassifier, PatternError};
pub use model::*;
pub use processor::ChangesetProcessor;
pub use renames::RenameResolver;
