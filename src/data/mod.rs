//! Sample data sources.
//!
//! Real curves arrive through `io::ingest`; this module only hosts the seeded
//! synthetic generator used for demos and tests.

pub mod synthetic;

pub use synthetic::*;
