use ninterp::error::{InterpolateError, ValidateError};
use thiserror::Error;

/// Errors produced while building or querying a forcing provider.
#[derive(Debug, Error)]
pub enum ForcingError {
    /// The requested day lies outside the span the provider covers.
    #[error("no forcing for day {day}: coverage is [{start}, {end}]")]
    Exhausted { day: f64, start: f64, end: f64 },

    /// Two sample columns that must align have different lengths.
    #[error("`{series}` has {actual} samples but the time axis has {expected}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A sample is NaN or infinite.
    #[error("`{series}` sample {index} is not finite")]
    NonFinite { series: &'static str, index: usize },

    /// Interpolation needs at least two samples.
    #[error("a series needs at least two samples, got {0}")]
    TooFewSamples(usize),

    /// An annual cycle has no samples or zero years were requested.
    #[error("an annual cycle needs at least one sample and one year")]
    EmptyCycle,

    #[error(transparent)]
    Validation(#[from] ValidateError),

    #[error(transparent)]
    Interpolation(#[from] InterpolateError),
}
