//! Shared domain types.
//!
//! Registry records are created once per run and never mutated. Series types
//! carry a clone of their owning record so they can be handed to reporting or
//! exported without keeping the registry borrowed.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Genre tag used when a record has no usable genre.
pub const UNKNOWN_GENRE: &str = "Unknown";

/// One movie from the metadata registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    pub release_date: NaiveDate,
    /// `Vote Average` column.
    pub rating: Option<f64>,
    pub popularity: Option<f64>,
    pub genres: Vec<String>,
}

impl MovieRecord {
    /// First genre token, or `"Unknown"` when the list is empty or blank.
    pub fn primary_genre(&self) -> &str {
        self.genres
            .first()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .unwrap_or(UNKNOWN_GENRE)
    }
}

/// A single observation: calendar day and interest score.
///
/// The cells are kept as read so canonical files carry the export's own text
/// (`2023-07-21T14`, `<1`); `day` and `interest` are their parsed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub day: NaiveDate,
    pub interest: u8,
    pub day_cell: String,
    pub interest_cell: String,
}

impl SeriesRow {
    /// Row whose cells are the plain `YYYY-MM-DD` and integer renderings.
    pub fn new(day: NaiveDate, interest: u8) -> Self {
        Self {
            day,
            interest,
            day_cell: day.format("%Y-%m-%d").to_string(),
            interest_cell: interest.to_string(),
        }
    }
}

/// An unprocessed export as read from the trends directory.
#[derive(Debug, Clone)]
pub struct RawSeriesExport {
    pub path: PathBuf,
    /// Header of the first column (`Day`, `Week`, ...). Replaced by `Day` on reconcile.
    pub axis_label: String,
    /// Noisy second-column header, e.g. `Barbie: (United States)`.
    pub source_label: String,
    pub rows: Vec<SeriesRow>,
}

/// A series keyed to exactly one registry record.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSeries {
    pub owner: MovieRecord,
    pub rows: Vec<SeriesRow>,
}

/// Inclusive day-offset range kept after alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionWindow {
    pub start: i64,
    pub end: i64,
}

impl RetentionWindow {
    pub const DEFAULT: RetentionWindow = RetentionWindow { start: -60, end: 14 };

    pub fn contains(self, day_offset: i64) -> bool {
        (self.start..=self.end).contains(&day_offset)
    }
}

impl Default for RetentionWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Interest at a signed day offset from release (negative = before release).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedPoint {
    pub day_offset: i64,
    pub interest: u8,
}

/// A canonical series re-indexed onto the release-relative axis.
///
/// Points keep the source row order and are not gap-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub owner: MovieRecord,
    pub points: Vec<AlignedPoint>,
}

/// Resolved settings for one run.
///
/// Built from CLI flags, then environment, then defaults.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub metadata_path: PathBuf,
    pub trends_dir: PathBuf,
    /// Filename prefix identifying raw exports in `trends_dir`.
    pub raw_prefix: String,
    pub window: RetentionWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(genres: &[&str]) -> MovieRecord {
        MovieRecord {
            title: "Barbie".to_string(),
            release_date: NaiveDate::from_ymd_opt(2023, 7, 21).unwrap(),
            rating: Some(7.0),
            popularity: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn primary_genre_is_first_token_case_preserved() {
        assert_eq!(record(&["Comedy", "Adventure"]).primary_genre(), "Comedy");
        assert_eq!(record(&["science Fiction"]).primary_genre(), "science Fiction");
    }

    #[test]
    fn primary_genre_falls_back_to_unknown() {
        assert_eq!(record(&[]).primary_genre(), UNKNOWN_GENRE);
        assert_eq!(record(&["  "]).primary_genre(), UNKNOWN_GENRE);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = RetentionWindow::DEFAULT;
        assert!(w.contains(-60));
        assert!(w.contains(14));
        assert!(!w.contains(-61));
        assert!(!w.contains(15));
    }
}
