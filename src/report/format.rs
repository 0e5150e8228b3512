//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline modules stay free of presentation
//! - output changes are localized (the tests below pin the layout)

use std::collections::BTreeMap;

use crate::aggregate::MovieSummary;
use crate::align::AlignmentSet;
use crate::domain::{AlignedSeries, RetentionWindow};
use crate::reconcile::{ReconcileOutcome, ReconcileReport};

/// One status line per raw export plus the final counts.
pub fn format_reconcile_report(report: &ReconcileReport) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        let name = file_name(outcome.source());
        match outcome {
            ReconcileOutcome::Reconciled(f) => out.push_str(&format!(
                "ok    {name} -> {} ({} rows)\n",
                file_name(&f.target),
                f.rows
            )),
            ReconcileOutcome::Skipped { reason, .. } => out.push_str(&format!("skip  {name}: {reason}\n")),
            ReconcileOutcome::Failed { error, .. } => out.push_str(&format!("error {name}: {error}\n")),
        }
    }

    out.push_str(&format!(
        "Reconciled: processed={} skipped={} failed={}\n",
        report.processed(),
        report.skipped(),
        report.failed()
    ));
    out
}

/// Counts and per-movie problems from a registry-wide alignment.
pub fn format_alignment_status(set: &AlignmentSet) -> String {
    let mut out = String::new();
    for title in &set.missing {
        out.push_str(&format!("skip  {title}: no series file\n"));
    }
    for (title, err) in &set.failed {
        out.push_str(&format!("error {title}: {err}\n"));
    }
    out.push_str(&format!(
        "Aligned: processed={} skipped={} failed={}\n",
        set.series.len(),
        set.missing.len(),
        set.failed.len()
    ));
    out
}

/// Per-movie summary table.
pub fn format_summary_table(rows: &[MovieSummary], window: RetentionWindow) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Interest by movie (day offset {}..{}):\n",
        window.start, window.end
    ));
    out.push_str(
        format!(
            "{:<32} {:<16} {:>6} {:>8} {:>6} {:>10}\n",
            "title", "genre", "rating", "mean", "n", "peak@day"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<32} {:-<16} {:-<6} {:-<8} {:-<6} {:-<10}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        let rating = r.rating.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string());
        out.push_str(
            format!(
                "{:<32} {:<16} {:>6} {:>8.2} {:>6} {:>10}\n",
                truncate(&r.title, 32),
                truncate(&r.genre, 16),
                rating,
                r.mean_interest,
                r.points,
                format!("{}@{}", r.peak.interest, r.peak.day_offset),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Genre -> titles listing.
pub fn format_genre_groups(groups: &BTreeMap<String, Vec<&AlignedSeries>>) -> String {
    let mut out = String::from("Genres:\n");
    for (genre, members) in groups {
        let titles: Vec<&str> = members.iter().map(|s| s.owner.title.as_str()).collect();
        out.push_str(&format!("- {genre} ({}): {}\n", titles.len(), titles.join(", ")));
    }
    out
}

/// The aligned points of a single movie.
pub fn format_aligned_series(series: &AlignedSeries) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} (release {})\n",
        series.owner.title, series.owner.release_date
    ));
    out.push_str(&format!("{:>6} {:>8}\n", "day", "interest"));
    out.push_str(&format!("{:->6} {:->8}\n", "", ""));
    for p in &series.points {
        out.push_str(&format!("{:>6} {:>8}\n", p.day_offset, p.interest));
    }
    out
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
