use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, check};

/// How a physiological rate scales with temperature.
///
/// Every form is non-negative and non-decreasing in temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemperatureResponse {
    /// `q10^(T / 10)`: a factor of `q10` per 10 °C, equal to 1 at 0 °C.
    Q10 { q10: f64 },

    /// Bělehrádek form `((T - alpha) / (reference - alpha))^exponent`.
    ///
    /// Equal to 1 at `reference` and 0 at or below the biological zero `alpha`.
    Belehradek {
        alpha: f64,
        exponent: f64,
        reference: f64,
    },
}

impl TemperatureResponse {
    /// Returns the rate multiplier at `temperature` (°C).
    #[must_use]
    pub fn factor(&self, temperature: f64) -> f64 {
        match *self {
            Self::Q10 { q10 } => q10.powf(temperature / 10.0),
            Self::Belehradek {
                alpha,
                exponent,
                reference,
            } => {
                if temperature <= alpha {
                    0.0
                } else {
                    ((temperature - alpha) / (reference - alpha)).powf(exponent)
                }
            }
        }
    }

    pub(crate) fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        match *self {
            Self::Q10 { q10 } => check(name, q10, q10 >= 1.0, "q10 >= 1"),
            Self::Belehradek {
                alpha,
                exponent,
                reference,
            } => {
                check(name, alpha, true, "finite alpha")?;
                check(name, exponent, exponent > 0.0, "exponent > 0")?;
                check(name, reference, reference > alpha, "reference > alpha")
            }
        }
    }
}

/// How feeding saturates with prey concentration.
///
/// Every form maps prey in `[0, ∞)` onto a saturation in `[0, 1)` and is
/// non-decreasing. Negative prey values are treated as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreyResponse {
    /// Holling type II, `P / (K + P)`.
    Holling2 { half_saturation: f64 },

    /// Holling type III, `P² / (K² + P²)`.
    Holling3 { half_saturation: f64 },

    /// Ivlev, `1 - exp(-rate * P)`.
    Ivlev { rate: f64 },
}

impl PreyResponse {
    /// Returns the feeding saturation at prey concentration `food`.
    #[must_use]
    pub fn saturation(&self, food: f64) -> f64 {
        let prey = food.max(0.0);
        match *self {
            Self::Holling2 { half_saturation } => prey / (half_saturation + prey),
            Self::Holling3 { half_saturation } => {
                let squared = prey * prey;
                squared / (half_saturation * half_saturation + squared)
            }
            Self::Ivlev { rate } => -(-rate * prey).exp_m1(),
        }
    }

    pub(crate) fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        match *self {
            Self::Holling2 { half_saturation } | Self::Holling3 { half_saturation } => check(
                name,
                half_saturation,
                half_saturation > 0.0,
                "half_saturation > 0",
            ),
            Self::Ivlev { rate } => check(name, rate, rate > 0.0, "rate > 0"),
        }
    }
}
