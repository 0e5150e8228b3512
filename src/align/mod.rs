//! Release-relative alignment of canonical series.
//!
//! `day_offset = day - release_date` in whole days. Rows outside the retention
//! window are dropped. Missing days stay missing; there is no gap filling.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::{AlignedPoint, AlignedSeries, CanonicalSeries, MovieRecord, RetentionWindow};
use crate::error::PipelineError;
use crate::io::registry::Registry;
use crate::io::trends::read_canonical;

/// Re-index `series` onto the release-day offset axis, keeping `window` only.
pub fn align(series: &CanonicalSeries, window: RetentionWindow) -> AlignedSeries {
    let release = series.owner.release_date;
    let points: Vec<AlignedPoint> = series
        .rows
        .iter()
        .map(|row| AlignedPoint {
            day_offset: (row.day - release).num_days(),
            interest: row.interest,
        })
        .filter(|p| window.contains(p.day_offset))
        .collect();

    let dropped = series.rows.len() - points.len();
    if dropped > 0 {
        debug!(title = %series.owner.title, dropped, "rows outside retention window");
    }

    AlignedSeries {
        owner: series.owner.clone(),
        points,
    }
}

/// Load and align the canonical series of one movie.
pub fn align_movie(dir: &Path, owner: &MovieRecord, window: RetentionWindow) -> Result<AlignedSeries, PipelineError> {
    let series = read_canonical(dir, owner)?;
    Ok(align(&series, window))
}

/// Aligned series for every registry movie that has a usable canonical file.
#[derive(Debug, Default)]
pub struct AlignmentSet {
    /// In registry order.
    pub series: Vec<AlignedSeries>,
    /// Titles with no canonical file yet.
    pub missing: Vec<String>,
    /// Titles whose canonical file could not be read.
    pub failed: Vec<(String, PipelineError)>,
}

/// Align every movie in the registry.
///
/// Absent files are expected (not every movie has been scraped) and are only
/// listed in `missing`.
pub fn align_registry(dir: &Path, registry: &Registry, window: RetentionWindow) -> AlignmentSet {
    let mut set = AlignmentSet::default();

    for owner in registry {
        match align_movie(dir, owner, window) {
            Ok(aligned) => set.series.push(aligned),
            Err(PipelineError::MissingSeriesFile { path }) => {
                debug!(title = %owner.title, path = %path.display(), "no series file");
                set.missing.push(owner.title.clone());
            }
            Err(err) => {
                warn!(title = %owner.title, "{err}");
                set.failed.push((owner.title.clone(), err));
            }
        }
    }

    info!(
        aligned = set.series.len(),
        missing = set.missing.len(),
        failed = set.failed.len(),
        "alignment complete"
    );
    set
}
