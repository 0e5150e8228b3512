//! Reductions over aligned series for downstream charting.
//!
//! All functions here are pure. Series with no points inside the window are
//! left out of every summary and grouping.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{AlignedPoint, AlignedSeries};

/// Per-movie summary over the retained window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieSummary {
    pub title: String,
    pub genre: String,
    pub rating: Option<f64>,
    pub mean_interest: f64,
    pub points: usize,
    /// Highest interest; earliest offset wins ties.
    pub peak: AlignedPoint,
}

/// One movie as handed to a chart sink.
#[derive(Debug, Clone, Serialize)]
pub struct SinkEntry {
    pub genre: String,
    pub release_date: chrono::NaiveDate,
    pub rating: Option<f64>,
    pub popularity: Option<f64>,
    pub points: Vec<AlignedPoint>,
}

/// Title -> aligned points plus genre tag.
pub type SinkPayload = BTreeMap<String, SinkEntry>;

/// Arithmetic mean of `interest`, or `None` for an empty series.
pub fn mean_interest(series: &AlignedSeries) -> Option<f64> {
    if series.points.is_empty() {
        return None;
    }
    let total: u64 = series.points.iter().map(|p| u64::from(p.interest)).sum();
    Some(total as f64 / series.points.len() as f64)
}

pub fn summarize(series: &AlignedSeries) -> Option<MovieSummary> {
    let mean_interest = mean_interest(series)?;
    let peak = series
        .points
        .iter()
        .copied()
        .reduce(|best, p| if p.interest > best.interest { p } else { best })?;

    Some(MovieSummary {
        title: series.owner.title.clone(),
        genre: series.owner.primary_genre().to_string(),
        rating: series.owner.rating,
        mean_interest,
        points: series.points.len(),
        peak,
    })
}

/// Summaries in input order, skipping empty series.
pub fn summarize_all(series: &[AlignedSeries]) -> Vec<MovieSummary> {
    series.iter().filter_map(summarize).collect()
}

/// Group non-empty series by primary genre (sorted by genre name).
pub fn group_by_genre(series: &[AlignedSeries]) -> BTreeMap<String, Vec<&AlignedSeries>> {
    let mut groups: BTreeMap<String, Vec<&AlignedSeries>> = BTreeMap::new();
    for s in series.iter().filter(|s| !s.points.is_empty()) {
        groups
            .entry(s.owner.primary_genre().to_string())
            .or_default()
            .push(s);
    }
    groups
}

/// Build the chart sink payload from non-empty series.
pub fn sink_payload(series: &[AlignedSeries]) -> SinkPayload {
    series
        .iter()
        .filter(|s| !s.points.is_empty())
        .map(|s| {
            (
                s.owner.title.clone(),
                SinkEntry {
                    genre: s.owner.primary_genre().to_string(),
                    release_date: s.owner.release_date,
                    rating: s.owner.rating,
                    popularity: s.owner.popularity,
                    points: s.points.clone(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{MovieRecord, UNKNOWN_GENRE};

    fn series(title: &str, genres: &[&str], points: &[(i64, u8)]) -> AlignedSeries {
        AlignedSeries {
            owner: MovieRecord {
                title: title.to_string(),
                release_date: NaiveDate::from_ymd_opt(2023, 7, 21).unwrap(),
                rating: Some(7.5),
                popularity: None,
                genres: genres.iter().map(|g| g.to_string()).collect(),
            },
            points: points
                .iter()
                .map(|&(day_offset, interest)| AlignedPoint { day_offset, interest })
                .collect(),
        }
    }

    #[test]
    fn mean_of_three_points() {
        let s = series("Barbie", &["Comedy"], &[(-1, 10), (0, 20), (1, 30)]);
        assert_eq!(mean_interest(&s), Some(20.0));
    }

    #[test]
    fn empty_series_has_no_mean_and_is_skipped() {
        let empty = series("Nope", &["Horror"], &[]);
        assert_eq!(mean_interest(&empty), None);
        assert!(summarize_all(&[empty.clone()]).is_empty());
        assert!(group_by_genre(std::slice::from_ref(&empty)).is_empty());
        assert!(sink_payload(&[empty]).is_empty());
    }

    #[test]
    fn summary_reports_peak_and_count() {
        let s = series("Barbie", &["Comedy", "Adventure"], &[(-3, 40), (0, 100), (2, 100), (5, 20)]);
        let summary = summarize(&s).unwrap();
        assert_eq!(summary.genre, "Comedy");
        assert_eq!(summary.points, 4);
        assert_eq!(summary.peak, AlignedPoint { day_offset: 0, interest: 100 });
        assert_eq!(summary.rating, Some(7.5));
        assert!((summary.mean_interest - 65.0).abs() < 1e-12);
    }

    #[test]
    fn grouping_uses_first_genre_or_unknown() {
        let all = vec![
            series("Barbie", &["Comedy", "Adventure"], &[(0, 1)]),
            series("Nope", &["Horror"], &[(0, 1)]),
            series("Smile", &["Horror", "Mystery"], &[(0, 1)]),
            series("Hamilton", &[], &[(0, 1)]),
        ];
        let groups = group_by_genre(&all);
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, ["Comedy", "Horror", UNKNOWN_GENRE]);

        let horror: Vec<&str> = groups["Horror"].iter().map(|s| s.owner.title.as_str()).collect();
        assert_eq!(horror, ["Nope", "Smile"]);
    }

    #[test]
    fn sink_payload_keys_by_title() {
        let mut barbie = series("Barbie", &["Comedy"], &[(-1, 10)]);
        barbie.owner.popularity = Some(48.2);
        let payload = sink_payload(&[barbie]);
        let entry = &payload["Barbie"];
        assert_eq!(entry.genre, "Comedy");
        assert_eq!(entry.rating, Some(7.5));
        assert_eq!(entry.popularity, Some(48.2));
        assert_eq!(entry.points, [AlignedPoint { day_offset: -1, interest: 10 }]);
    }
}
