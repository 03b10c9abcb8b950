//! Domain types used throughout the analysis pipeline.
//!
//! This module defines:
//!
//! - the test mode (`TestMode`) and raw inputs (`RawSample`)
//! - the immutable analysis configuration (`AnalysisConfig`)
//! - per-sample outputs (`TensileMetrics`, `CompressiveMetrics`, `AnalysisResult`)

pub mod types;

pub use types::*;
