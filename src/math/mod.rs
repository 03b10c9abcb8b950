//! Mathematical utilities: least squares, smoothing, and calculus on samples.

pub mod calculus;
pub mod ols;
pub mod savgol;

pub use calculus::*;
pub use ols::*;
pub use savgol::*;
