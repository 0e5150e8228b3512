//! Raw export reconciliation.
//!
//! For each raw export in the trends directory:
//!
//! 1. parse it (`MalformedExport` on failure)
//! 2. resolve the noisy label to a registry record (`UnmatchedTitle` if none)
//! 3. re-key it as `Day,<Title>` and write `trends_<title>.csv`, replacing any
//!    previous file for that movie
//! 4. delete the raw export, only after step 3 has fully landed
//!
//! Every file is independent: a failure is recorded in the report and the batch
//! moves on. Unmatched and malformed exports are left where they are.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::{CanonicalSeries, MovieRecord, PipelineConfig, RawSeriesExport};
use crate::error::PipelineError;
use crate::io::registry::Registry;
use crate::io::trends::{DAY_HEADER, discover_raw_exports, read_raw_export, write_canonical};
use crate::matcher::match_title;

/// A raw export that was turned into a canonical file.
#[derive(Debug, Clone)]
pub struct ReconciledFile {
    pub source: PathBuf,
    pub target: PathBuf,
    pub title: String,
    pub rows: usize,
}

/// Per-file result of a batch run.
#[derive(Debug)]
pub enum ReconcileOutcome {
    Reconciled(ReconciledFile),
    /// Nothing in the registry matched; the raw file is untouched.
    Skipped { source: PathBuf, reason: PipelineError },
    Failed { source: PathBuf, error: PipelineError },
}

impl ReconcileOutcome {
    pub fn source(&self) -> &Path {
        match self {
            ReconcileOutcome::Reconciled(f) => &f.source,
            ReconcileOutcome::Skipped { source, .. } | ReconcileOutcome::Failed { source, .. } => source,
        }
    }
}

/// Outcomes of one batch, in processing order.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub outcomes: Vec<ReconcileOutcome>,
}

impl ReconcileReport {
    pub fn processed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ReconcileOutcome::Reconciled(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ReconcileOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ReconcileOutcome::Failed { .. }))
            .count()
    }
}

/// Re-key a raw export to its owner. Rows keep their order and values.
pub fn reconcile(raw: RawSeriesExport, owner: &MovieRecord) -> CanonicalSeries {
    CanonicalSeries {
        owner: owner.clone(),
        rows: raw.rows,
    }
}

/// Reconcile one raw export file into `out_dir`.
pub fn reconcile_file(path: &Path, registry: &Registry, out_dir: &Path) -> Result<ReconciledFile, PipelineError> {
    let raw = read_raw_export(path)?;
    let owner = match_title(&raw.source_label, registry).ok_or_else(|| PipelineError::UnmatchedTitle {
        label: raw.source_label.clone(),
    })?;

    debug!(
        source = %path.display(),
        from = %format!("{},{}", raw.axis_label, raw.source_label),
        to = %format!("{DAY_HEADER},{}", owner.title),
        "replacing headers"
    );
    let series = reconcile(raw, owner);
    let rows = series.rows.len();
    let target = write_canonical(out_dir, &series)?;

    if target != path {
        fs::remove_file(path).map_err(|e| PipelineError::io(path, e))?;
    }

    Ok(ReconciledFile {
        source: path.to_path_buf(),
        target,
        title: owner.title.clone(),
        rows,
    })
}

/// Reconcile every raw export in the configured trends directory.
///
/// Only an unreadable directory is returned as an error; per-file problems are
/// recorded in the report.
pub fn reconcile_directory(config: &PipelineConfig, registry: &Registry) -> Result<ReconcileReport, PipelineError> {
    let paths = discover_raw_exports(&config.trends_dir, &config.raw_prefix)?;
    info!(count = paths.len(), dir = %config.trends_dir.display(), "found raw exports");

    let mut report = ReconcileReport::default();
    for path in paths {
        let outcome = match reconcile_file(&path, registry, &config.trends_dir) {
            Ok(file) => {
                info!(source = %file.source.display(), target = %file.target.display(), "reconciled");
                ReconcileOutcome::Reconciled(file)
            }
            Err(reason @ PipelineError::UnmatchedTitle { .. }) => {
                warn!(source = %path.display(), "{reason}");
                ReconcileOutcome::Skipped { source: path, reason }
            }
            Err(error) => {
                warn!(source = %path.display(), "{error}");
                ReconcileOutcome::Failed { source: path, error }
            }
        };
        report.outcomes.push(outcome);
    }

    Ok(report)
}
