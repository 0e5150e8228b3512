//! Export aligned series as JSON for an external chart renderer.
//!
//! The file is the sink payload: a title-keyed object of
//! `{ genre, release_date, rating, popularity, points: [{ day_offset, interest }] }`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::aggregate::SinkPayload;
use crate::error::AppError;

/// Write the sink payload as pretty JSON.
pub fn write_sink_json(path: &Path, payload: &SinkPayload) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, payload)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::aggregate::SinkEntry;
    use crate::domain::AlignedPoint;

    #[test]
    fn writes_title_keyed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aligned.json");

        let mut payload = SinkPayload::new();
        payload.insert(
            "Barbie".to_string(),
            SinkEntry {
                genre: "Comedy".to_string(),
                release_date: NaiveDate::from_ymd_opt(2023, 7, 21).unwrap(),
                rating: Some(7.0),
                popularity: Some(48.2),
                points: vec![AlignedPoint { day_offset: -1, interest: 40 }],
            },
        );
        write_sink_json(&path, &payload).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["Barbie"]["genre"], "Comedy");
        assert_eq!(value["Barbie"]["release_date"], "2023-07-21");
        assert_eq!(value["Barbie"]["popularity"], 48.2);
        assert_eq!(value["Barbie"]["points"][0]["day_offset"], -1);
    }
}
