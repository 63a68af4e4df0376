//! # Sheetflow - workbook merge and output bundling pipeline
//!
//! Sheetflow joins a project workbook against a mandatory reference
//! workbook, derives a summed `Total` column, then discovers the
//! tabular files in the run's working directory and bundles the top
//! candidates into a zip archive.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Workbooks   │────▶│   Merge     │────▶│  Output     │────▶│   Select    │
//! │ (xlsx/csv)  │     │  + Total    │     │  (workdir)  │     │   + Zip     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sheetflow::{run_pipeline, ConsoleSink, RunContext, RunOptions};
//!
//! let mut ctx = RunContext::new()?;
//! ctx.stage_project("proyecto.xlsx", &project_bytes)?;
//! ctx.stage_reference(&reference_bytes)?;
//!
//! let report = run_pipeline(&ctx, &RunOptions::default(), &ConsoleSink)?;
//! println!("Merged {} rows", report.merged_rows);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`model`] - Datasets and scalar cells
//! - [`reader`] - Workbook and CSV readers
//! - [`writer`] - Workbook and CSV writers
//! - [`transform`] - Merge, Total derivation, and pipeline
//! - [`select`] - Output discovery and two-tier selection
//! - [`archive`] - Zip bundling
//! - [`workdir`] - Per-run scoped working directory
//! - [`progress`] - Structured progress events

// Core modules
pub mod error;
pub mod model;

// Tabular IO
pub mod reader;
pub mod writer;

// Transformation
pub mod transform;

// Output handling
pub mod archive;
pub mod select;

// Run scaffolding
pub mod progress;
pub mod workdir;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    JoinError,
    MissingInputError,
    PackagingError,
    PipelineError,
    ReadError,
    WriteError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use model::{Cell, Dataset};

// =============================================================================
// Re-exports - Tabular IO
// =============================================================================

pub use reader::{is_tabular, read_csv, read_dataset, read_workbook};
pub use writer::write_dataset;

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    append_total,
    merge_datasets,
    run_merge,
    run_pipeline,
    RunOptions,
    RunReport,
    TOTAL_COLUMN,
};

// =============================================================================
// Re-exports - Selection & Packaging
// =============================================================================

pub use archive::{bundle_selection, DEFAULT_ARCHIVE_NAME};
pub use select::{select_candidates, select_outputs, Candidate, Selection, OUTPUT_MARKER, SELECTION_LIMIT};

// =============================================================================
// Re-exports - Run scaffolding
// =============================================================================

pub use progress::{
    ConsoleSink,
    MemorySink,
    NullSink,
    ProgressEvent,
    ProgressLevel,
    ProgressSink,
    Stage,
};
pub use workdir::{
    RunContext,
    ITEMS_FILE_NAME,
    OUTPUT_FILE_NAME,
    REFERENCE_FILE_NAME,
    WORKDIR_PREFIX,
};
