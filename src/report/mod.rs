//! Reporting: terminal tables for batch results and group statistics.

pub mod format;

pub use format::*;
