//! Sequential multi-document driver.
//!
//! Documents are processed strictly one at a time: open → transform →
//! persist or discard → next. A failure in one document is reported and
//! the batch moves on; only a refused precondition (no files, empty
//! pattern set, missing output directory) stops a run before it starts.

use crate::docx::DocxDocument;
use crate::engine;
use crate::pattern::{MatchMode, PatternSet};
use crate::report::Console;
use anyhow::{Context, Result, bail};
use chrono::Local;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// What happens to a modified document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Report would-be changes without writing anything.
    DryRun,
    /// Write modified copies under a session folder in the output root.
    CopyToOutput,
    /// Overwrite the original files.
    InPlace,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::DryRun => write!(f, "dry-run"),
            RunMode::CopyToOutput => write!(f, "create-copies"),
            RunMode::InPlace => write!(f, "in-place"),
        }
    }
}

/// Batch-level aggregate returned by [`BatchProcessor::run`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub processed_files: usize,
    pub modified_files: usize,
    pub total_replacements: usize,
    pub output_dir: Option<PathBuf>,
    pub mode: RunMode,
}

/// Applies one pattern set, in one match mode, to many documents.
pub struct BatchProcessor {
    patterns: PatternSet,
    match_mode: MatchMode,
    show_details: bool,
}

impl BatchProcessor {
    pub fn new(patterns: PatternSet, match_mode: MatchMode) -> Self {
        Self {
            patterns,
            match_mode,
            show_details: false,
        }
    }

    /// Also print each changed node's audit record to the console.
    pub fn show_details(mut self, yes: bool) -> Self {
        self.show_details = yes;
        self
    }

    pub fn run(
        &self,
        files: &[PathBuf],
        mode: RunMode,
        output_root: Option<&Path>,
        console: &Console,
    ) -> Result<RunSummary> {
        if files.is_empty() {
            bail!("no documents to process; pass .docx files or a folder");
        }
        if self.patterns.is_empty() {
            bail!("pattern set is empty; load a pattern file first");
        }
        if mode == RunMode::CopyToOutput && output_root.is_none() {
            bail!("create-copies mode requires an output directory");
        }

        let mut summary = RunSummary {
            processed_files: 0,
            modified_files: 0,
            total_replacements: 0,
            output_dir: None,
            mode,
        };
        // One session folder per run, named when the first copy is written.
        let session = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut output_dir: Option<PathBuf> = None;

        console.line(&format!(
            "Starting {} ({} mode) on {} file(s)",
            mode,
            self.match_mode,
            files.len()
        ));
        info!("batch start: mode={mode} files={}", files.len());

        for path in files {
            if !path.exists() {
                console.warn(&format!("File not found: {}", path.display()));
                continue;
            }

            match self.process_one(path, mode, output_root, &mut output_dir, &session, console) {
                Ok(changed) => {
                    summary.processed_files += 1;
                    if let Some(count) = changed {
                        summary.modified_files += 1;
                        summary.total_replacements += count;
                    }
                }
                Err(e) => {
                    console.error(&format!("Error processing {}: {e:#}", path.display()));
                }
            }
        }

        summary.output_dir = output_dir;
        info!(
            "batch done: processed={} modified={} replacements={}",
            summary.processed_files, summary.modified_files, summary.total_replacements
        );
        Ok(summary)
    }

    /// Transform one document. Returns the number of changed nodes, or
    /// `None` when the document needed no changes.
    fn process_one(
        &self,
        path: &Path,
        mode: RunMode,
        output_root: Option<&Path>,
        output_dir: &mut Option<PathBuf>,
        session: &str,
        console: &Console,
    ) -> Result<Option<usize>> {
        let mut doc = DocxDocument::load(path)?;
        let result = engine::apply(&mut doc, &self.patterns, self.match_mode)
            .with_context(|| format!("failed to transform {}", path.display()))?;

        if result.replacements_made == 0 {
            console.line(&format!("No changes needed: {}", file_name(path)));
            return Ok(None);
        }

        if self.show_details {
            for record in &result.details {
                console.line(&format!(
                    "  {}: '{}' -> '{}'",
                    record.location, record.original, record.modified
                ));
            }
        }

        match mode {
            RunMode::DryRun => {
                console.line(&format!(
                    "Would modify {}: {} node(s)",
                    file_name(path),
                    result.replacements_made
                ));
            }
            RunMode::CopyToOutput => {
                let root = output_root.context("create-copies mode requires an output directory")?;
                let dir = ensure_output_dir(output_dir, root, session)?;
                let target = allocate_output_path(&dir, path);
                doc.save_to(&target)
                    .with_context(|| format!("failed to save copy of {}", path.display()))?;
                console.line(&format!(
                    "Created modified copy of {}: {} node(s)",
                    file_name(path),
                    result.replacements_made
                ));
            }
            RunMode::InPlace => {
                doc.save_to(path)
                    .with_context(|| format!("failed to save {}", path.display()))?;
                console.line(&format!(
                    "Modified {}: {} node(s)",
                    file_name(path),
                    result.replacements_made
                ));
            }
        }

        Ok(Some(result.replacements_made))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Create (once per run) and return the session output directory.
fn ensure_output_dir(
    current: &mut Option<PathBuf>,
    root: &Path,
    session: &str,
) -> Result<PathBuf> {
    if let Some(dir) = current {
        return Ok(dir.clone());
    }
    let dir = root.join(format!("modified_{session}"));
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    *current = Some(dir.clone());
    Ok(dir)
}

/// Pick a filename in `dir` for a copy of `source`, appending `_1`, `_2`…
/// when the plain name is already taken.
fn allocate_output_path(dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let extension = source
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("docx");

    let mut candidate = dir.join(format!("{stem}.{extension}"));
    let mut counter = 1usize;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}_{counter}.{extension}"));
        counter += 1;
    }
    candidate
}

/// Expand CLI path arguments into a document list. Directories are walked
/// recursively for `.docx` files in path order, so the batch order is the
/// same on every run; `~`-prefixed Office temp files are skipped.
pub fn collect_documents(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            walk_folder(input, &mut out)?;
        } else {
            out.push(input.clone());
        }
    }
    Ok(out)
}

fn walk_folder(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    // read_dir order is filesystem dependent; sort for reproducible runs
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to scan folder: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("failed to scan folder: {}", dir.display()))?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk_folder(&path, out)?;
        } else if is_docx(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_docx(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !name.starts_with('~') && name.to_ascii_lowercase().ends_with(".docx")
}
