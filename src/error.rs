use thiserror::Error;

/// Pipeline stage at which a sample ran out of usable points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsufficientStage {
    /// Raw input before any cleaning.
    Raw,
    /// After dropping non-finite (strain, stress) pairs.
    Finite,
    /// After collapsing duplicate strain values.
    Unique,
}

impl std::fmt::Display for InsufficientStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            InsufficientStage::Raw => "raw input",
            InsufficientStage::Finite => "after removing NaN/Inf",
            InsufficientStage::Unique => "after removing duplicate strain",
        };
        f.write_str(label)
    }
}

/// Axis whose span collapsed below the degeneracy threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeAxis {
    Strain,
    Stress,
}

impl std::fmt::Display for RangeAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeAxis::Strain => f.write_str("strain"),
            RangeAxis::Stress => f.write_str("stress"),
        }
    }
}

/// Failure that aborts the analysis of a single sample.
///
/// Everything else (fit failure, smoothing failure, integration failure)
/// resolves to a documented fallback value inside the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("data dimension mismatch: strain({strain}) vs stress({stress})")]
    DimensionMismatch { strain: usize, stress: usize },

    #[error("insufficient data points {stage}: {count} < {required}")]
    InsufficientData {
        stage: InsufficientStage,
        count: usize,
        required: usize,
    },

    #[error("{axis} range too small ({span:.2e}); data appears to be static noise")]
    DegenerateRange { axis: RangeAxis, span: f64 },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        AppError::new(3, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_error_messages_name_the_stage() {
        let err = CurveError::InsufficientData {
            stage: InsufficientStage::Unique,
            count: 4,
            required: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data points after removing duplicate strain: 4 < 5"
        );
    }

    #[test]
    fn curve_error_maps_to_analysis_exit_code() {
        let err: AppError = CurveError::DimensionMismatch { strain: 3, stress: 4 }.into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("strain(3) vs stress(4)"));
    }
}
