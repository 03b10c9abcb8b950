//! Batch statistics over analysis records.

pub mod aggregate;

pub use aggregate::*;
