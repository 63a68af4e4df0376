//! Per-run scoped working directory and run context.
//!
//! Every pipeline run owns one isolated directory holding the staged
//! input files and everything the transform writes. Nothing is shared
//! between runs; the directory is removed when the context is dropped
//! unless the caller asks to keep it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::error::MissingInputError;

/// Prefix for the scoped temporary directory.
pub const WORKDIR_PREFIX: &str = "etl_run_";

/// Fixed name the reference workbook is staged under.
pub const REFERENCE_FILE_NAME: &str = "reference.xlsx";

/// Fixed-name copy of the optional items workbook.
pub const ITEMS_FILE_NAME: &str = "items.xlsx";

/// Default filename of the merged output workbook.
pub const OUTPUT_FILE_NAME: &str = "output_project.xlsx";

enum WorkDir {
    Temp(tempfile::TempDir),
    Fixed(PathBuf),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            WorkDir::Temp(dir) => dir.path(),
            WorkDir::Fixed(path) => path,
        }
    }
}

/// Explicit state for one pipeline run.
///
/// Replaces ambient globals: the working directory handle, the staged
/// input locations and the cancellation flag all travel through this
/// context.
pub struct RunContext {
    id: Uuid,
    dir: WorkDir,
    project: Option<PathBuf>,
    reference: Option<PathBuf>,
    items: Option<PathBuf>,
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    /// Create a context backed by a fresh scoped temporary directory.
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(WORKDIR_PREFIX).tempdir()?;
        Ok(Self::with_workdir(WorkDir::Temp(dir)))
    }

    /// Create a context over a caller-owned directory. The directory is
    /// created if missing and is not removed on drop.
    pub fn in_dir(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path)?;
        Ok(Self::with_workdir(WorkDir::Fixed(path)))
    }

    fn with_workdir(dir: WorkDir) -> Self {
        Self {
            id: Uuid::new_v4(),
            dir,
            project: None,
            reference: None,
            items: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Unique run identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The working directory for this run.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a file inside the working directory.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir().join(name)
    }

    // =========================================================================
    // Input staging
    // =========================================================================

    /// Stage the project workbook under its original filename.
    pub fn stage_project(&mut self, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
        let path = self.path_of(filename);
        std::fs::write(&path, bytes)?;
        self.project = Some(path);
        Ok(())
    }

    /// Stage the reference workbook under its fixed name.
    pub fn stage_reference(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let path = self.path_of(REFERENCE_FILE_NAME);
        std::fs::write(&path, bytes)?;
        self.reference = Some(path);
        Ok(())
    }

    /// Stage the optional items workbook under its original filename,
    /// plus the fixed-name copy downstream collaborators expect.
    pub fn stage_items(&mut self, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
        let original = self.path_of(filename);
        std::fs::write(&original, bytes)?;

        let fixed = self.path_of(ITEMS_FILE_NAME);
        if fixed != original {
            std::fs::copy(&original, &fixed)?;
        }
        self.items = Some(fixed);
        Ok(())
    }

    /// Staged project path, or the missing-input error.
    pub fn project_path(&self) -> Result<&Path, MissingInputError> {
        self.project.as_deref().ok_or(MissingInputError::Project)
    }

    /// Staged reference path, or the missing-input error.
    pub fn reference_path(&self) -> Result<&Path, MissingInputError> {
        self.reference.as_deref().ok_or(MissingInputError::Reference)
    }

    /// Staged items path, if the optional file was supplied.
    pub fn items_path(&self) -> Option<&Path> {
        self.items.as_deref()
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    /// Handle that a caller can flip to cancel the run between stages.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Disarm cleanup and hand the directory to the caller.
    pub fn keep(self) -> PathBuf {
        match self.dir {
            WorkDir::Temp(dir) => dir.keep(),
            WorkDir::Fixed(path) => path,
        }
    }
}
