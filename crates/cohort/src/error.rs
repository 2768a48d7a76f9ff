use thiserror::Error;

/// A malformed parameter set or run request.
///
/// This is the only failure a cohort run reports as an error. Every
/// biological outcome, including death and infeasible strategies, is returned
/// as data in the [`Outcome`](crate::Outcome).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("`{name}` must be finite")]
    NonFinite { name: &'static str },

    #[error("`{name}` = {value} is out of range: expected {expected}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("invalid parameter document: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Checks that `value` is finite and satisfies `in_range`.
pub(crate) fn check(
    name: &'static str,
    value: f64,
    in_range: bool,
    expected: &'static str,
) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { name });
    }
    if !in_range {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            expected,
        });
    }
    Ok(())
}
