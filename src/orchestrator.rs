//! Batch indexing over every configured folder.
//!
//! Folders are processed strictly in list order on the calling thread. Per
//! folder the flow is engine → path resolution → write; a folder with no
//! report, no output directory, or a failed write is skipped and the batch
//! moves on. Only a failure that makes writing impossible for every folder
//! (storage full) stops the run. Reports already written are never rolled
//! back.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::engine::IndexEngine;
use crate::error::{Result, TreeIndexError};
use crate::output::resolve;

/// Why a folder produced no report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Engine returned nothing (missing, unreadable, or empty folder).
    EmptyReport,
    /// The output directory does not exist.
    OutputDirMissing,
    /// Writing this folder's report failed.
    WriteFailed,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyReport => "empty report",
            Self::OutputDirMissing => "output directory missing",
            Self::WriteFailed => "write failed",
        }
    }
}

/// What happened to one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    Written(PathBuf),
    Skipped(SkipReason),
}

/// Per-folder results of one run, in processing order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<(PathBuf, FolderOutcome)>,
    /// True if the run stopped early on request.
    pub cancelled: bool,
    pub duration: Duration,
}

impl RunReport {
    /// Report files written, in order.
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            FolderOutcome::Written(path) => Some(path.as_path()),
            FolderOutcome::Skipped(_) => None,
        })
    }

    #[must_use]
    pub fn written_count(&self) -> usize {
        self.written().count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.written_count()
    }
}

/// Runs an [`IndexEngine`] over a config's folder list.
pub struct Orchestrator<E> {
    engine: E,
    cancel: Option<Arc<AtomicBool>>,
}

impl<E: IndexEngine> Orchestrator<E> {
    pub const fn new(engine: E) -> Self {
        Self { engine, cancel: None }
    }

    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Stop between folders once `flag` is set. Without a flag a run
    /// always completes.
    #[must_use]
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Index every folder in `config`, dating reports with today's local date.
    ///
    /// # Errors
    /// Returns `TreeIndexError::OutputUnavailable` if storage is full.
    pub fn run(&self, config: &Config) -> Result<RunReport> {
        self.run_on(config, Local::now().date_naive())
    }

    /// Same as [`run`](Self::run) with a fixed date.
    ///
    /// # Errors
    /// Returns `TreeIndexError::OutputUnavailable` if storage is full.
    pub fn run_on(&self, config: &Config, today: NaiveDate) -> Result<RunReport> {
        let start = Instant::now();
        let mut report = RunReport::default();
        let mut written_this_run: HashSet<PathBuf> = HashSet::new();

        for folder in &config.folders {
            if self.is_cancelled() {
                tracing::info!(
                    remaining = config.folders.len() - report.outcomes.len(),
                    "Indexing cancelled"
                );
                report.cancelled = true;
                break;
            }

            let outcome = self.index_folder(config, folder, today, &mut written_this_run)?;
            report.outcomes.push((folder.clone(), outcome));
        }

        report.duration = start.elapsed();
        tracing::info!(
            folders = config.folders.len(),
            written = report.written_count(),
            skipped = report.skipped_count(),
            duration_secs = %format!("{:.2}", report.duration.as_secs_f64()),
            "Indexing complete"
        );
        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn index_folder(
        &self,
        config: &Config,
        folder: &Path,
        today: NaiveDate,
        written_this_run: &mut HashSet<PathBuf>,
    ) -> Result<FolderOutcome> {
        let report = match self.engine.index(folder, &config.indexer_settings) {
            Some(text) if !text.is_empty() => text,
            _ => {
                tracing::debug!(folder = %folder.display(), "No report produced, skipping");
                return Ok(FolderOutcome::Skipped(SkipReason::EmptyReport));
            }
        };

        let Some(path) = resolve(config, folder, today) else {
            return Ok(FolderOutcome::Skipped(SkipReason::OutputDirMissing));
        };

        if !written_this_run.insert(path.clone()) {
            tracing::warn!(
                folder = %folder.display(),
                path = %path.display(),
                "Report name already used in this run, overwriting"
            );
        }

        match fs::write(&path, report) {
            Ok(()) => {
                tracing::debug!(folder = %folder.display(), path = %path.display(), "Wrote report");
                Ok(FolderOutcome::Written(path))
            }
            Err(e) if e.kind() == ErrorKind::StorageFull => {
                tracing::error!(path = %path.display(), error = %e, "Storage full, stopping run");
                Err(TreeIndexError::OutputUnavailable { path, source: e })
            }
            Err(e) => {
                tracing::warn!(
                    folder = %folder.display(),
                    path = %path.display(),
                    error = %e,
                    "Failed to write report"
                );
                Ok(FolderOutcome::Skipped(SkipReason::WriteFailed))
            }
        }
    }
}
