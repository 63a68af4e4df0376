//! High-level pipeline orchestration.
//!
//! Combines all stages as one in-process, blocking computation:
//! read inputs → merge → derive Total → write output → discover →
//! select → archive. Each stage completion is reported through the
//! caller-supplied [`ProgressSink`], and the context's cancellation
//! flag is checked between stages.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetflow::{run_pipeline, ConsoleSink, RunContext, RunOptions};
//!
//! let mut ctx = RunContext::new()?;
//! ctx.stage_project("proyecto.xlsx", &project_bytes)?;
//! ctx.stage_reference(&reference_bytes)?;
//!
//! let report = run_pipeline(&ctx, &RunOptions::default(), &ConsoleSink)?;
//! println!("selected: {:?}", report.selected);
//! ```

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::archive::{bundle_selection, DEFAULT_ARCHIVE_NAME};
use crate::error::{PipelineError, PipelineResult};
use crate::model::Dataset;
use crate::progress::{ProgressSink, Stage};
use crate::reader::read_dataset;
use crate::select::{select_outputs, Selection};
use crate::transform::merge::{append_total, merge_datasets};
use crate::workdir::{RunContext, OUTPUT_FILE_NAME};
use crate::writer::write_dataset;

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Filename of the merged output, written into the working
    /// directory. The extension picks the format (`.xlsx` or `.csv`).
    pub output_name: String,

    /// Filename of the bundled archive.
    pub archive_name: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_name: OUTPUT_FILE_NAME.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Run identifier, matching the context.
    pub run_id: Uuid,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,

    /// Rows read from the project workbook.
    pub project_rows: usize,

    /// Rows read from the reference workbook.
    pub reference_rows: usize,

    /// Rows read from the optional items workbook, if supplied.
    pub items_rows: Option<usize>,

    /// Rows in the merged output.
    pub merged_rows: usize,

    /// Path of the merged output file.
    pub output_path: PathBuf,

    /// Discovery and selection outcome.
    pub selection: Selection,

    /// Path of the bundled archive, absent when nothing was selected.
    pub archive_path: Option<PathBuf>,

    /// Advisory flag: discovery found no output files at all.
    pub no_outputs: bool,
}

impl RunReport {
    /// Filenames of the chosen outputs.
    pub fn selected(&self) -> Vec<&str> {
        self.selection.chosen.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Run the full pipeline over a staged context.
///
/// Inputs must already be staged via [`RunContext::stage_project`] and
/// [`RunContext::stage_reference`]; the optional items workbook is read
/// only for its row count.
pub fn run_pipeline(
    ctx: &RunContext,
    options: &RunOptions,
    sink: &dyn ProgressSink,
) -> PipelineResult<RunReport> {
    let started_at = Utc::now();

    // Stage 1: read inputs.
    checkpoint(ctx)?;
    let stage_start = Instant::now();

    sink.info("Reading project workbook...");
    let project_path = ctx.project_path()?;
    let project = read_dataset(project_path)?;
    sink.success(&format!(
        "Project loaded: {} rows, {} columns",
        project.row_count(),
        project.column_count()
    ));

    sink.info("Reading reference workbook...");
    let reference = read_dataset(ctx.reference_path()?)?;
    sink.success(&format!("Reference loaded: {} rows", reference.row_count()));

    let items_rows = match ctx.items_path() {
        Some(path) => {
            sink.info("Reading items workbook...");
            let items = read_dataset(path)?;
            sink.success(&format!(
                "Items loaded: {} rows (not consumed by the merge)",
                items.row_count()
            ));
            Some(items.row_count())
        }
        None => {
            sink.warning("No items workbook supplied, proceeding without it");
            None
        }
    };
    sink.stage_completed(
        Stage::Read,
        project.row_count() + reference.row_count() + items_rows.unwrap_or(0),
        elapsed_ms(stage_start),
    );

    // Stage 2: merge and derive.
    checkpoint(ctx)?;
    let stage_start = Instant::now();
    sink.info("Merging project against reference...");
    let merged = run_merge(&project, &reference)?;
    sink.success(&format!("Merged dataset: {} rows", merged.row_count()));
    sink.success("Column 'Total' derived");
    sink.stage_completed(Stage::Merge, merged.row_count(), elapsed_ms(stage_start));

    // Stage 3: persist.
    checkpoint(ctx)?;
    let stage_start = Instant::now();
    let output_path = ctx.path_of(&options.output_name);
    write_dataset(&merged, &output_path)?;
    sink.success(&format!("Output written: {}", options.output_name));
    sink.stage_completed(Stage::Write, merged.row_count(), elapsed_ms(stage_start));

    // Stage 4: discover and select.
    checkpoint(ctx)?;
    let stage_start = Instant::now();
    let selection = select_outputs(ctx.dir())?;
    let no_outputs = selection.is_empty();
    if no_outputs {
        sink.warning("No outputs produced");
    } else {
        sink.success(&format!(
            "Discovered {} file(s), selected {}",
            selection.discovered.len(),
            selection.chosen.len()
        ));
    }
    sink.stage_completed(Stage::Select, selection.chosen.len(), elapsed_ms(stage_start));

    // Stage 5: archive. Skipped, not an error, when nothing was found.
    checkpoint(ctx)?;
    let stage_start = Instant::now();
    let archive_path = if selection.chosen.is_empty() {
        None
    } else {
        let path = bundle_selection(&selection.chosen, &ctx.path_of(&options.archive_name))?;
        sink.success(&format!("Archive built: {}", options.archive_name));
        Some(path)
    };
    sink.stage_completed(
        Stage::Archive,
        selection.chosen.len(),
        elapsed_ms(stage_start),
    );

    Ok(RunReport {
        run_id: ctx.id(),
        started_at,
        finished_at: Utc::now(),
        project_rows: project.row_count(),
        reference_rows: reference.row_count(),
        items_rows,
        merged_rows: merged.row_count(),
        output_path,
        selection,
        archive_path,
        no_outputs,
    })
}

/// Merge two datasets and derive the Total column, without touching
/// the filesystem. Used by the pipeline and by the CLI debug command.
pub fn run_merge(project: &Dataset, reference: &Dataset) -> PipelineResult<Dataset> {
    let mut merged = merge_datasets(project, reference)?;
    append_total(&mut merged);
    Ok(merged)
}

fn checkpoint(ctx: &RunContext) -> PipelineResult<()> {
    if ctx.is_cancelled() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
