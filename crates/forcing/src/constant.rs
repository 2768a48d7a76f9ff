use crate::{Forcing, ForcingError};

/// Fixed environmental conditions.
///
/// Unbounded by default; [`ConstantForcing::covering`] limits the span so the
/// provider behaves like a finite record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantForcing {
    temperature: f64,
    deep_temperature: Option<f64>,
    food: f64,
    coverage: Option<(f64, f64)>,
}

impl ConstantForcing {
    /// Creates unbounded forcing with the given surface temperature and prey.
    #[must_use]
    pub fn new(temperature: f64, food: f64) -> Self {
        Self {
            temperature,
            deep_temperature: None,
            food,
            coverage: None,
        }
    }

    /// Sets a separate temperature at diapause depth.
    #[must_use]
    pub fn with_deep_temperature(mut self, temperature: f64) -> Self {
        self.deep_temperature = Some(temperature);
        self
    }

    /// Restricts coverage to `[start, end]`.
    #[must_use]
    pub fn covering(mut self, start: f64, end: f64) -> Self {
        self.coverage = Some((start, end));
        self
    }

    fn check(&self, day: f64) -> Result<(), ForcingError> {
        match self.coverage {
            Some((start, end)) if day.is_nan() || day < start || day > end => {
                Err(ForcingError::Exhausted { day, start, end })
            }
            _ => Ok(()),
        }
    }
}

impl Forcing for ConstantForcing {
    fn temperature_at(&self, day: f64) -> Result<f64, ForcingError> {
        self.check(day)?;
        Ok(self.temperature)
    }

    fn food_at(&self, day: f64) -> Result<f64, ForcingError> {
        self.check(day)?;
        Ok(self.food)
    }

    fn deep_temperature_at(&self, day: f64) -> Result<f64, ForcingError> {
        self.check(day)?;
        Ok(self.deep_temperature.unwrap_or(self.temperature))
    }
}
