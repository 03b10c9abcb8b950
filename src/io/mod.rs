//! Input/output helpers.
//!
//! - CSV ingest of raw curves and strength tables (`ingest`)
//! - JSON result export (`export`)
//! - persisted analysis configuration (`config`)

pub mod config;
pub mod export;
pub mod ingest;

pub use config::*;
pub use export::*;
pub use ingest::*;
