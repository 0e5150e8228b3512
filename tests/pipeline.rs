//! End-to-end pipeline tests: registry + raw exports on disk -> reconcile -> align -> aggregate.

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use hype_check::aggregate::{group_by_genre, mean_interest, summarize_all};
use hype_check::align::{align, align_registry};
use hype_check::domain::{CanonicalSeries, MovieRecord, PipelineConfig, RetentionWindow, SeriesRow};
use hype_check::io::registry::{Registry, load_registry};
use hype_check::matcher::{match_title, normalize_title};
use hype_check::reconcile::{ReconcileOutcome, reconcile_directory};

const REGISTRY: &str = concat!(
    "Title,Release Date,Popularity,Vote Average,Genres\n",
    "Barbie,2023-07-21,48.2,7.0,\"Comedy, Adventure, Fantasy\"\n",
    "Oppenheimer,2023-07-19,40.1,8.1,\"Drama, History\"\n",
    "Thunderbolts*,2025-05-02,90.3,7.4,\"Action, Science Fiction\"\n",
    "Dune,2021-09-15,30.0,7.8,\n",
);

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        metadata_path: dir.join("movie_metadata.csv"),
        trends_dir: dir.to_path_buf(),
        raw_prefix: "multiTimeline".to_string(),
        window: RetentionWindow::DEFAULT,
    }
}

/// Daily export covering `[from, to]` relative to `release`, interest = offset + 70.
fn export_text(label: &str, release: NaiveDate, from: i64, to: i64) -> String {
    let mut text = format!("Category: All categories\n\nDay,{label}\n");
    for offset in from..=to {
        let day = release + Duration::days(offset);
        text.push_str(&format!("{},{}\n", day.format("%Y-%m-%d"), offset + 70));
    }
    text
}

#[test]
fn full_run_reconciles_aligns_and_summarizes() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::write(&cfg.metadata_path, REGISTRY).unwrap();

    let barbie_release = NaiveDate::from_ymd_opt(2023, 7, 21).unwrap();
    let thunder_release = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
    fs::write(
        dir.path().join("multiTimeline.csv"),
        export_text("Barbie: (United States)", barbie_release, -65, 20),
    )
    .unwrap();
    fs::write(
        dir.path().join("multiTimeline (1).csv"),
        export_text("Thunderbolts: (United States)", thunder_release, -2, 2),
    )
    .unwrap();
    fs::write(
        dir.path().join("multiTimeline (2).csv"),
        export_text("Wicked: (United States)", barbie_release, 0, 1),
    )
    .unwrap();

    let loaded = load_registry(&cfg.metadata_path).unwrap();
    let report = reconcile_directory(&cfg, &loaded.registry).unwrap();
    assert_eq!(report.processed(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 0);

    let skipped: Vec<&ReconcileOutcome> = report
        .outcomes
        .iter()
        .filter(|o| matches!(o, ReconcileOutcome::Skipped { .. }))
        .collect();
    assert_eq!(skipped[0].source(), dir.path().join("multiTimeline (2).csv").as_path());
    assert!(dir.path().join("multiTimeline (2).csv").exists());
    assert!(!dir.path().join("multiTimeline.csv").exists());
    assert!(dir.path().join("trends_Barbie.csv").exists());
    assert!(dir.path().join("trends_Thunderbolts.csv").exists());

    let set = align_registry(&cfg.trends_dir, &loaded.registry, cfg.window);
    assert_eq!(set.missing, ["Oppenheimer", "Dune"]);
    assert!(set.failed.is_empty());

    let barbie = &set.series[0];
    assert_eq!(barbie.owner.title, "Barbie");
    assert_eq!(barbie.points.len(), 75);
    assert_eq!(barbie.points.first().unwrap().day_offset, -60);
    assert_eq!(barbie.points.last().unwrap().day_offset, 14);

    // Interest is offset + 70 over [-60, 14]: mean offset is -23.
    assert!((mean_interest(barbie).unwrap() - 47.0).abs() < 1e-9);

    let summaries = summarize_all(&set.series);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1].title, "Thunderbolts*");
    assert_eq!(summaries[1].genre, "Action");

    let groups = group_by_genre(&set.series);
    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(keys, ["Action", "Comedy"]);
}

#[test]
fn rerun_is_idempotent_for_the_same_export() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    fs::write(&cfg.metadata_path, REGISTRY).unwrap();
    let release = NaiveDate::from_ymd_opt(2023, 7, 21).unwrap();
    let raw = export_text("Barbie: (United States)", release, -3, 3);
    let registry = load_registry(&cfg.metadata_path).unwrap().registry;

    fs::write(dir.path().join("multiTimeline.csv"), &raw).unwrap();
    reconcile_directory(&cfg, &registry).unwrap();
    let first = fs::read(dir.path().join("trends_Barbie.csv")).unwrap();

    fs::write(dir.path().join("multiTimeline.csv"), &raw).unwrap();
    reconcile_directory(&cfg, &registry).unwrap();
    let second = fs::read(dir.path().join("trends_Barbie.csv")).unwrap();

    assert_eq!(first, second);

    // Nothing left to do on a third pass.
    let report = reconcile_directory(&cfg, &registry).unwrap();
    assert!(report.outcomes.is_empty());
}

#[test]
fn offsets_around_release() {
    let owner = MovieRecord {
        title: "Barbie".to_string(),
        release_date: NaiveDate::from_ymd_opt(2023, 7, 21).unwrap(),
        rating: Some(7.0),
        popularity: None,
        genres: vec!["Comedy".to_string()],
    };
    let series = CanonicalSeries {
        owner,
        rows: vec![
            SeriesRow::new(NaiveDate::from_ymd_opt(2023, 7, 20).unwrap(), 10),
            SeriesRow::new(NaiveDate::from_ymd_opt(2023, 8, 4).unwrap(), 20),
        ],
    };
    let aligned = align(&series, RetentionWindow::DEFAULT);
    assert_eq!(aligned.points[0].day_offset, -1);
    assert_eq!(aligned.points[1].day_offset, 14);
}

fn registry_of(titles: &[String]) -> Registry {
    let release = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    Registry::new(
        titles
            .iter()
            .map(|t| MovieRecord {
                title: t.clone(),
                release_date: release,
                rating: None,
                popularity: None,
                genres: Vec::new(),
            })
            .collect(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_normalize_is_idempotent(s in "[ -~éÉß]{0,40}") {
        let once = normalize_title(&s);
        prop_assert_eq!(normalize_title(&once), once);
    }

    #[test]
    fn prop_substring_label_matches_first_containing_title(
        titles in prop::collection::vec("[A-Za-z][A-Za-z ]{0,15}", 1..6),
        pick in any::<prop::sample::Index>(),
        start in any::<prop::sample::Index>(),
        len in 1usize..8,
    ) {
        let registry = registry_of(&titles);
        let target: Vec<char> = pick.get(&titles).chars().collect();
        let from = start.index(target.len());
        let to = (from + len).min(target.len());
        let label: String = target[from..to].iter().collect();

        let needle = normalize_title(&label);
        let expected = titles.iter().find(|t| normalize_title(t).contains(&needle));

        let got = match_title(&format!("{label}: (United States)"), &registry);
        prop_assert!(got.is_some());
        prop_assert_eq!(&got.unwrap().title, expected.unwrap());
    }

    #[test]
    fn prop_aligned_points_stay_inside_window(
        offsets in prop::collection::vec((-200i64..200, 0u8..=100), 0..60),
    ) {
        let release = NaiveDate::from_ymd_opt(2023, 7, 21).unwrap();
        let series = CanonicalSeries {
            owner: MovieRecord {
                title: "Barbie".to_string(),
                release_date: release,
                rating: None,
                popularity: None,
                genres: Vec::new(),
            },
            rows: offsets
                .iter()
                .map(|&(o, interest)| SeriesRow::new(release + Duration::days(o), interest))
                .collect(),
        };

        let aligned = align(&series, RetentionWindow::DEFAULT);
        prop_assert!(aligned.points.iter().all(|p| (-60..=14).contains(&p.day_offset)));

        let kept: Vec<(i64, u8)> = offsets.iter().copied().filter(|(o, _)| (-60..=14).contains(o)).collect();
        let got: Vec<(i64, u8)> = aligned.points.iter().map(|p| (p.day_offset, p.interest)).collect();
        prop_assert_eq!(got, kept);
    }
}
