//! Test-variant reduction.
//!
//! Picks a small set of real test variants from one family such that every
//! `t`-wise combination of category values that real variants exhibit is
//! exercised by at least one of them.

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod snapshot;

pub use config::{ConfigError, ReductionConfig};
pub use pipeline::{reduce, reduce_with, Outcome, ReduceError, Reduction};
pub use snapshot::{Snapshot, SnapshotError, TestRecord};
