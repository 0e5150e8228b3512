//! Reporting: status lines, summary tables and genre listings.

pub mod format;

pub use format::*;
