//! Shared pipeline steps used by the CLI handlers.
//!
//! registry load -> reconcile raw exports -> align canonical series -> summarize
//!
//! Keeping the workflow here lets `app` focus on printing.

use tracing::info;

use crate::aggregate::{MovieSummary, summarize_all};
use crate::align::{AlignmentSet, align_registry};
use crate::domain::{AlignedSeries, PipelineConfig};
use crate::error::AppError;
use crate::io::registry::{LoadedRegistry, Registry, load_registry};
use crate::reconcile::{ReconcileReport, reconcile_directory};

/// Load the registry. Failure here is fatal for every command.
pub fn load(config: &PipelineConfig) -> Result<LoadedRegistry, AppError> {
    let loaded = load_registry(&config.metadata_path)?;
    info!(
        movies = loaded.registry.len(),
        skipped = loaded.row_errors.len(),
        path = %config.metadata_path.display(),
        "registry loaded"
    );
    Ok(loaded)
}

/// Reconcile every raw export in the trends directory.
pub fn run_reconcile(config: &PipelineConfig, registry: &Registry) -> Result<ReconcileReport, AppError> {
    reconcile_directory(config, registry).map_err(|e| {
        AppError::new(
            2,
            format!("Cannot scan trends directory '{}': {e}", config.trends_dir.display()),
        )
    })
}

/// All computed outputs of a summary run.
#[derive(Debug)]
pub struct SummaryOutput {
    pub alignment: AlignmentSet,
    pub summaries: Vec<MovieSummary>,
}

/// Align every registry movie and summarize, optionally keeping one genre.
pub fn run_summary(config: &PipelineConfig, registry: &Registry, genre: Option<&str>) -> SummaryOutput {
    let mut alignment = align_registry(&config.trends_dir, registry, config.window);
    if let Some(genre) = genre {
        alignment.series.retain(|s| matches_genre(s, genre));
    }
    let summaries = summarize_all(&alignment.series);

    SummaryOutput { alignment, summaries }
}

fn matches_genre(series: &AlignedSeries, genre: &str) -> bool {
    series.owner.primary_genre().eq_ignore_ascii_case(genre.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use crate::domain::RetentionWindow;

    fn config(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            metadata_path: dir.join("movie_metadata.csv"),
            trends_dir: dir.to_path_buf(),
            raw_prefix: "multiTimeline".to_string(),
            window: RetentionWindow::DEFAULT,
        }
    }

    #[test]
    fn summary_filters_by_primary_genre() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("movie_metadata.csv"),
            concat!(
                "Title,Release Date,Popularity,Vote Average,Genres\n",
                "Barbie,2023-07-21,48.2,7.0,\"Comedy, Adventure\"\n",
                "Smile,2022-09-23,30.0,6.7,\"Horror, Mystery\"\n",
            ),
        )
        .unwrap();
        fs::write(dir.path().join("trends_Barbie.csv"), "Day,Barbie\n2023-07-21,100\n").unwrap();
        fs::write(dir.path().join("trends_Smile.csv"), "Day,Smile\n2022-09-22,50\n2022-09-23,70\n").unwrap();

        let cfg = config(dir.path());
        let loaded = load(&cfg).unwrap();

        let all = run_summary(&cfg, &loaded.registry, None);
        assert_eq!(all.summaries.len(), 2);

        let horror = run_summary(&cfg, &loaded.registry, Some("horror"));
        assert_eq!(horror.summaries.len(), 1);
        assert_eq!(horror.summaries[0].title, "Smile");
        assert!((horror.summaries[0].mean_interest - 60.0).abs() < 1e-12);
    }

    #[test]
    fn missing_registry_is_exit_code_two() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&config(dir.path())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
