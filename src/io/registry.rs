//! Registry CSV ingest.
//!
//! Turns the metadata table (`Title, Release Date, Popularity, Vote Average, Genres`)
//! into an ordered, read-only `Registry`.
//!
//! - required columns missing, or an unreadable file: fatal (`RegistryLoadFailure`)
//! - bad rows: skipped and reported as `RowError`s
//! - row order is preserved; matching depends on it

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::MovieRecord;
use crate::error::PipelineError;
use crate::io::parse_day;

const COL_TITLE: &str = "title";
const COL_RELEASE: &str = "release date";
const COL_POPULARITY: &str = "popularity";
const COL_VOTE_AVERAGE: &str = "vote average";
const COL_GENRES: &str = "genres";

/// A registry row that was skipped during load.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub title: Option<String>,
    pub message: String,
}

/// The canonical movie table, in source order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    movies: Vec<MovieRecord>,
}

impl Registry {
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        Self { movies }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovieRecord> {
        self.movies.iter()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Exact title lookup.
    pub fn get(&self, title: &str) -> Option<&MovieRecord> {
        self.movies.iter().find(|m| m.title == title)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a MovieRecord;
    type IntoIter = std::slice::Iter<'a, MovieRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.movies.iter()
    }
}

/// Registry plus the rows that could not be used.
#[derive(Debug, Clone)]
pub struct LoadedRegistry {
    pub registry: Registry,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load the registry from a CSV file.
pub fn load_registry(path: &Path) -> Result<LoadedRegistry, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::RegistryLoadFailure {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    read_registry(file, path)
}

/// Load the registry from any reader; `path` is only used in error messages.
pub fn read_registry<R: Read>(input: R, path: &Path) -> Result<LoadedRegistry, PipelineError> {
    let fail = |reason: String| PipelineError::RegistryLoadFailure {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| fail(format!("failed to read headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in [COL_TITLE, COL_RELEASE] {
        if !header_map.contains_key(required) {
            return Err(fail(format!("missing required column `{required}`")));
        }
    }

    let mut movies = Vec::new();
    let mut seen = HashSet::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    title: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(movie) => {
                if !seen.insert(movie.title.clone()) {
                    row_errors.push(RowError {
                        line,
                        title: Some(movie.title),
                        message: "duplicate title (first occurrence kept)".to_string(),
                    });
                    continue;
                }
                debug!(title = %movie.title, release = %movie.release_date, "registry row");
                movies.push(movie);
            }
            Err(message) => row_errors.push(RowError {
                line,
                title: get_optional(&record, &header_map, COL_TITLE).map(str::to_string),
                message,
            }),
        }
    }

    for err in &row_errors {
        warn!(line = err.line, title = ?err.title, "skipping registry row: {}", err.message);
    }

    if movies.is_empty() {
        return Err(fail("no valid movie rows".to_string()));
    }

    Ok(LoadedRegistry {
        registry: Registry::new(movies),
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<MovieRecord, String> {
    let title = get_optional(record, header_map, COL_TITLE)
        .ok_or_else(|| "Missing required value: `Title`".to_string())?
        .to_string();
    let release_raw = get_optional(record, header_map, COL_RELEASE)
        .ok_or_else(|| "Missing required value: `Release Date`".to_string())?;
    let release_date = parse_day(release_raw)?;

    let popularity = parse_opt_f64(get_optional(record, header_map, COL_POPULARITY));
    let rating = parse_opt_f64(get_optional(record, header_map, COL_VOTE_AVERAGE));
    let genres = get_optional(record, header_map, COL_GENRES)
        .map(split_genres)
        .unwrap_or_default();

    Ok(MovieRecord {
        title,
        release_date,
        rating,
        popularity,
        genres,
    })
}

// Tokens stay positional: a blank first token must still read as "no primary genre".
fn split_genres(raw: &str) -> Vec<String> {
    raw.split(',').map(|g| g.trim().to_string()).collect()
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
