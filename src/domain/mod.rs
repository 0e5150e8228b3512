//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - registry records (`MovieRecord`)
//! - raw and canonical trend series (`RawSeriesExport`, `CanonicalSeries`)
//! - release-aligned series (`AlignedSeries`) and the retention window
//! - run configuration (`PipelineConfig`)

pub mod types;

pub use types::*;
