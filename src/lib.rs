//! `hype-check` library crate.
//!
//! Links exported search-interest series to a movie metadata registry and
//! re-indexes them around each release date:
//!
//! raw export -> `matcher` -> `reconcile` -> `align` -> `aggregate`
//!
//! The binary (`hype`) is a thin wrapper around this library so the pipeline
//! can be tested without spawning processes.

pub mod aggregate;
pub mod align;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod matcher;
pub mod reconcile;
pub mod report;
