//! Transformation module.
//!
//! - Merge: left outer join plus the derived Total column
//! - Pipeline: full run orchestration over a working directory

pub mod merge;
pub mod pipeline;

pub use merge::{append_total, merge_datasets, TOTAL_COLUMN};
pub use pipeline::{run_merge, run_pipeline, RunOptions, RunReport};
