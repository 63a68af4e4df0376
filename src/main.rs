//! Sheetflow CLI - merge workbooks and bundle the outputs
//!
//! # Main Commands
//!
//! ```bash
//! sheetflow run proyecto.xlsx reference.xlsx     # Full pipeline run
//! sheetflow run proyecto.xlsx reference.xlsx --items items.xlsx --out downloads/
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! sheetflow merge proyecto.xlsx reference.xlsx -o merged.xlsx
//! sheetflow select ./workdir                    # Show discovery and selection
//! sheetflow pack ./workdir -o bundle.zip        # Zip the selection
//! ```

use clap::{Parser, Subcommand};
use sheetflow::{
    bundle_selection, read_dataset, run_merge, run_pipeline, select_outputs, write_dataset,
    ConsoleSink, NullSink, ProgressSink, RunContext, RunOptions, DEFAULT_ARCHIVE_NAME,
    OUTPUT_FILE_NAME,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetflow")]
#[command(about = "Merge a project workbook against a reference table and bundle the outputs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: stage inputs, merge, derive Total, select, zip
    Run {
        /// Project workbook (xlsx/xls/csv)
        project: PathBuf,

        /// Reference workbook, joined on the project's first column
        reference: PathBuf,

        /// Optional items workbook (staged, not consumed by the merge)
        #[arg(short, long)]
        items: Option<PathBuf>,

        /// Directory to copy the selected files and archive into
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Filename of the merged output (extension picks the format)
        #[arg(long, default_value = OUTPUT_FILE_NAME)]
        output_name: String,

        /// Keep the working directory instead of removing it
        #[arg(long)]
        keep: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Merge two tabular files and derive Total (no selection/zip)
    Merge {
        /// Project file
        project: PathBuf,

        /// Reference file
        reference: PathBuf,

        /// Output file (extension picks the format)
        #[arg(short, long, default_value = "merged.xlsx")]
        output: PathBuf,
    },

    /// Show discovery and selection for a directory
    Select {
        /// Directory to scan
        dir: PathBuf,
    },

    /// Zip the selected outputs of a directory
    Pack {
        /// Directory to scan
        dir: PathBuf,

        /// Archive path (default: <dir>/outputs_top3.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            project,
            reference,
            items,
            out,
            output_name,
            keep,
            quiet,
        } => cmd_run(
            &project,
            &reference,
            items.as_deref(),
            out.as_deref(),
            output_name,
            keep,
            quiet,
        ),

        Commands::Merge {
            project,
            reference,
            output,
        } => cmd_merge(&project, &reference, &output),

        Commands::Select { dir } => cmd_select(&dir),

        Commands::Pack { dir, output } => cmd_pack(&dir, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(
    project: &Path,
    reference: &Path,
    items: Option<&Path>,
    out: Option<&Path>,
    output_name: String,
    keep: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", project.display());

    let mut ctx = RunContext::new()?;
    ctx.stage_project(&original_name(project), &fs::read(project)?)?;
    ctx.stage_reference(&fs::read(reference)?)?;
    if let Some(items) = items {
        ctx.stage_items(&original_name(items), &fs::read(items)?)?;
    }

    let options = RunOptions {
        output_name,
        archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
    };

    let console = ConsoleSink;
    let null = NullSink;
    let sink: &dyn ProgressSink = if quiet { &null } else { &console };

    let report = run_pipeline(&ctx, &options, sink)?;

    eprintln!("\n⚙️  Merged: {} rows", report.merged_rows);
    if report.no_outputs {
        eprintln!("⚠️  No outputs produced");
    } else {
        eprintln!("📦 Selected files:");
        for name in report.selected() {
            eprintln!("   - {}", name);
        }
    }

    // Serve the "downloads": copy selection plus archive out of the
    // scoped directory before it is cleaned up.
    if let Some(out) = out {
        fs::create_dir_all(out)?;
        for candidate in &report.selection.chosen {
            fs::copy(&candidate.path, out.join(&candidate.name))?;
        }
        if let Some(ref archive) = report.archive_path {
            let name = archive
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.into());
            fs::copy(archive, out.join(name))?;
        }
        eprintln!("💾 Copied to: {}", out.display());
    }

    if keep {
        let dir = ctx.keep();
        eprintln!("📂 Working directory kept: {}", dir.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_merge(
    project: &Path,
    reference: &Path,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Merging: {} + {}", project.display(), reference.display());

    let project = read_dataset(project)?;
    let reference = read_dataset(reference)?;
    eprintln!("   Project: {} rows", project.row_count());
    eprintln!("   Reference: {} rows", reference.row_count());

    let merged = run_merge(&project, &reference)?;
    write_dataset(&merged, output)?;

    eprintln!("✅ {} rows written to {}", merged.row_count(), output.display());
    Ok(())
}

fn cmd_select(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let selection = select_outputs(dir)?;

    if selection.is_empty() {
        eprintln!("⚠️  No outputs produced in {}", dir.display());
        return Ok(());
    }

    eprintln!("📋 Discovered {} file(s):", selection.discovered.len());
    for c in &selection.discovered {
        println!("  {}", c.name);
    }

    let tier = if selection.from_preferred_tier {
        "output-tagged tier"
    } else {
        "full set (no tagged files)"
    };
    eprintln!("\n📦 Selection from {}:", tier);
    for c in &selection.chosen {
        println!("  {}", c.name);
    }

    Ok(())
}

fn cmd_pack(dir: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let selection = select_outputs(dir)?;
    if selection.chosen.is_empty() {
        eprintln!("⚠️  Nothing to pack in {}", dir.display());
        return Ok(());
    }

    let default_path = dir.join(DEFAULT_ARCHIVE_NAME);
    let archive_path = output.unwrap_or(&default_path);
    let path = bundle_selection(&selection.chosen, archive_path)?;

    eprintln!("✅ Archived {} file(s) to {}", selection.chosen.len(), path.display());
    Ok(())
}

fn original_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .unwrap_or_else(|| "input.xlsx".to_string())
}
