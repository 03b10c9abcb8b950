//! `ecc-curves` library crate.
//!
//! Stress–strain analysis for strain-hardening cementitious composites (ECC):
//! validation and smoothing of raw test records, tension metrics (moduli,
//! first crack, ultimate state, energy, hardening) and compression metrics
//! (peak strength, secant modulus), plus group statistics.
//!
//! The binary (`ecc`) is a thin wrapper around this library so the analysis
//! stays testable without spawning processes.

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod stats;
