//! Input/output helpers.
//!
//! - registry CSV ingest (`registry`)
//! - raw export parsing and canonical series read/write (`trends`)
//! - aligned-series JSON export for downstream charting (`export`)

use chrono::NaiveDate;

pub mod export;
pub mod registry;
pub mod trends;

pub use export::*;
pub use registry::*;
pub use trends::*;

/// Parse a calendar day.
///
/// Accepts `YYYY-MM-DD`, and timestamps starting with one (`2023-07-21T00:00:00`,
/// `2023-07-21 14:00`), which hourly exports and some registry dumps produce.
pub fn parse_day(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    let date_part = s
        .get(..10)
        .filter(|_| matches!(s.as_bytes().get(10), Some(b'T' | b' ')));
    if let Some(d) = date_part.and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()) {
        return Ok(d);
    }
    Err(format!("Invalid date '{s}'. Expected YYYY-MM-DD."))
}
