//! Trend series files: raw exports in, canonical per-movie files out.
//!
//! Raw export layout (as saved from the trends site):
//!
//! ```text
//! Category: All categories          <- banner, skipped
//!                                   <- optional blank line(s)
//! Day,Barbie: (United States)       <- axis header + noisy label
//! 2023-05-22,12
//! 2023-05-23,<1
//! ```
//!
//! Canonical layout is a plain two-column CSV with header `Day,<Title>`, stored as
//! `trends_<sanitized title>.csv` next to the raw exports.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::{CanonicalSeries, MovieRecord, RawSeriesExport, SeriesRow};
use crate::error::PipelineError;
use crate::io::parse_day;

/// Header of the first column in canonical files.
pub const DAY_HEADER: &str = "Day";

const CANONICAL_PREFIX: &str = "trends_";
const MAX_INTEREST: u8 = 100;
/// Characters removed from titles when building file names.
const STRIPPED_CHARS: [char; 9] = [':', '*', '/', '\\', '?', '"', '<', '>', '|'];

/// Deterministic canonical file name for a title.
///
/// Spaces become `_`; colons, asterisks and path-hostile characters are removed.
pub fn canonical_file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    format!("{CANONICAL_PREFIX}{stem}.csv")
}

/// Canonical file path for `owner` inside `dir`.
pub fn canonical_path(dir: &Path, owner: &MovieRecord) -> PathBuf {
    dir.join(canonical_file_name(&owner.title))
}

/// List raw exports in `dir` whose file name starts with `prefix`, sorted by name.
pub fn discover_raw_exports(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        let path = entry.path();
        let is_raw = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix));
        if is_raw && path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Read and validate a raw export.
pub fn read_raw_export(path: &Path) -> Result<RawSeriesExport, PipelineError> {
    let text = fs::read_to_string(path).map_err(|e| PipelineError::malformed(path, e.to_string()))?;
    parse_raw_export(&text, path)
}

/// Parse raw export text; `path` is carried into the result and error messages.
pub fn parse_raw_export(text: &str, path: &Path) -> Result<RawSeriesExport, PipelineError> {
    let body = skip_banner(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::malformed(path, format!("unreadable header: {e}")))?
        .clone();
    if headers.len() != 2 {
        return Err(PipelineError::malformed(
            path,
            format!("expected 2 columns, found {}", headers.len()),
        ));
    }

    let axis_label = headers[0].trim_start_matches('\u{feff}').to_string();
    let source_label = headers[1].to_string();
    if source_label.is_empty() {
        return Err(PipelineError::malformed(path, "empty series label"));
    }

    let rows = read_rows(&mut reader, path)?;

    Ok(RawSeriesExport {
        path: path.to_path_buf(),
        axis_label,
        source_label,
        rows,
    })
}

/// Write `series` to its canonical path in `dir`, replacing any existing file.
///
/// The data is staged in a temp file in the same directory and renamed into
/// place, so the target is either the old file or the complete new one.
pub fn write_canonical(dir: &Path, series: &CanonicalSeries) -> Result<PathBuf, PipelineError> {
    let target = canonical_path(dir, &series.owner);

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| PipelineError::io(dir, e))?;
    encode_canonical(staged.as_file_mut(), series).map_err(|e| PipelineError::io(&target, e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| PipelineError::io(&target, e))?;
    staged
        .persist(&target)
        .map_err(|e| PipelineError::io(&target, e.error))?;

    debug!(path = %target.display(), rows = series.rows.len(), "wrote canonical series");
    Ok(target)
}

/// Serialize a canonical series as CSV (`Day,<Title>` header).
///
/// Row cells are written exactly as they were read.
pub fn encode_canonical<W: Write>(out: W, series: &CanonicalSeries) -> io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([DAY_HEADER, series.owner.title.as_str()])?;
    for row in &series.rows {
        writer.write_record([row.day_cell.as_str(), row.interest_cell.as_str()])?;
    }
    writer.flush()
}

/// Read the canonical series for `owner` from `dir`.
///
/// A missing file is reported as `MissingSeriesFile` so callers can skip quietly.
pub fn read_canonical(dir: &Path, owner: &MovieRecord) -> Result<CanonicalSeries, PipelineError> {
    let path = canonical_path(dir, owner);
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(PipelineError::MissingSeriesFile { path });
        }
        Err(e) => return Err(PipelineError::io(&path, e)),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    // Only the column positions matter; the header names are not checked.
    let width = reader
        .headers()
        .map_err(|e| PipelineError::malformed(&path, format!("unreadable header: {e}")))?
        .len();
    if width != 2 {
        return Err(PipelineError::malformed(
            &path,
            format!("expected 2 columns, found {width}"),
        ));
    }

    let rows = read_rows(&mut reader, &path)?;
    Ok(CanonicalSeries {
        owner: owner.clone(),
        rows,
    })
}

fn read_rows<R: io::Read>(reader: &mut csv::Reader<R>, path: &Path) -> Result<Vec<SeriesRow>, PipelineError> {
    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| PipelineError::malformed(path, format!("line {line}: {e}")))?;
        if record.len() != 2 {
            return Err(PipelineError::malformed(
                path,
                format!("line {line}: expected 2 fields, found {}", record.len()),
            ));
        }
        let day = parse_day(&record[0]).map_err(|e| PipelineError::malformed(path, format!("line {line}: {e}")))?;
        let interest =
            parse_interest(&record[1]).map_err(|e| PipelineError::malformed(path, format!("line {line}: {e}")))?;
        rows.push(SeriesRow {
            day,
            interest,
            day_cell: record[0].to_string(),
            interest_cell: record[1].to_string(),
        });
    }
    Ok(rows)
}

/// Drop the banner line and any blank lines before the header.
fn skip_banner(text: &str) -> &str {
    let rest = match text.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    };
    rest.trim_start_matches(['\r', '\n', ' ', '\t'])
}

fn parse_interest(s: &str) -> Result<u8, String> {
    // The trends site writes "<1" for interest that rounds below one.
    if s == "<1" {
        return Ok(0);
    }
    match s.parse::<u8>() {
        Ok(v) if v <= MAX_INTEREST => Ok(v),
        _ => Err(format!("Invalid interest '{s}'. Expected an integer 0-100 or '<1'.")),
    }
}
