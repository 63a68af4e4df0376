//! Error types for the sheetflow pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`MissingInputError`] - required input file not supplied
//! - [`ReadError`] - tabular file parsing errors
//! - [`JoinError`] - merge/join structural errors
//! - [`WriteError`] - output persistence errors
//! - [`PackagingError`] - archive construction errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. Every error is
//! terminal for the current run; there is no retry layer.

use thiserror::Error;

// =============================================================================
// Missing Input Errors
// =============================================================================

/// A required input file was not supplied.
///
/// Raised before any processing happens; the working directory holds
/// nothing beyond the staged files at that point.
#[derive(Debug, Error)]
pub enum MissingInputError {
    /// The project workbook is mandatory.
    #[error("Missing required project workbook")]
    Project,

    /// The reference workbook is mandatory.
    #[error("Missing required reference workbook")]
    Reference,
}

// =============================================================================
// Read Errors
// =============================================================================

/// Errors while reading a tabular file into a dataset.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Failed to open or read the file.
    #[error("Failed to read '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be parsed as a spreadsheet workbook.
    #[error("Cannot parse '{file}' as a spreadsheet: {message}")]
    Spreadsheet { file: String, message: String },

    /// The workbook contains no worksheet to read.
    #[error("'{file}' contains no worksheet")]
    NoWorksheet { file: String },

    /// The file could not be parsed as delimited text.
    #[error("Cannot parse '{file}' as CSV: {message}")]
    Csv { file: String, message: String },

    /// The extension is not a recognized tabular format.
    #[error("Unsupported tabular format: '{file}'")]
    UnsupportedFormat { file: String },
}

// =============================================================================
// Join Errors
// =============================================================================

/// Errors during the merge step.
#[derive(Debug, Error)]
pub enum JoinError {
    /// The project dataset has no columns, so there is no join key.
    #[error("Project dataset has no columns to join on")]
    EmptyProject,

    /// The reference dataset does not carry the key column.
    #[error("Join key column '{column}' not found in reference dataset")]
    KeyMissingInReference { column: String },
}

// =============================================================================
// Write Errors
// =============================================================================

/// Errors while persisting a dataset.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Filesystem failure (disk, permissions).
    #[error("Failed to write '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// Workbook serialization failure.
    #[error("Cannot build workbook '{file}': {message}")]
    Xlsx { file: String, message: String },

    /// CSV serialization failure.
    #[error("Cannot write CSV '{file}': {message}")]
    Csv { file: String, message: String },

    /// The target extension is not a recognized tabular format.
    #[error("Unsupported output format: '{file}'")]
    UnsupportedFormat { file: String },
}

// =============================================================================
// Packaging Errors
// =============================================================================

/// Errors while bundling selected outputs into an archive.
///
/// Non-fatal to the individual output files already produced; only
/// the archive artifact is withheld.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// A selected file vanished between selection and archiving.
    #[error("Selected output '{file}' disappeared before archiving")]
    MemberMissing { file: String },

    /// Nothing was selected, so there is nothing to bundle.
    #[error("No files selected for archiving")]
    EmptySelection,

    /// Archive IO failure.
    #[error("Archive IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip container construction failure.
    #[error("Zip error: {0}")]
    Zip(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::run_pipeline`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required input missing.
    #[error("Input error: {0}")]
    MissingInput(#[from] MissingInputError),

    /// Tabular read error.
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    /// Merge error.
    #[error("Join error: {0}")]
    Join(#[from] JoinError),

    /// Output persistence error.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// Archive construction error.
    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// Working directory staging error.
    #[error("Working directory error: {0}")]
    Io(#[from] std::io::Error),

    /// The run was cancelled between stages.
    #[error("Pipeline run cancelled")]
    Cancelled,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for read operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type for merge operations.
pub type JoinResult<T> = Result<T, JoinError>;

/// Result type for write operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for packaging operations.
pub type PackagingResult<T> = Result<T, PackagingError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
