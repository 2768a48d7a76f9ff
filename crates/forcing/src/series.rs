use std::fmt;

use coltrane_core::DAYS_PER_YEAR;
use ndarray::Array1;
use ninterp::{
    interpolator::Extrapolate,
    prelude::{Interp1DOwned, Interpolator},
    strategy::Linear,
};

use crate::{Forcing, ForcingError};

type Channel = Interp1DOwned<f64, Linear>;

/// Sampled forcing, linearly interpolated between samples.
///
/// All channels share one strictly increasing time axis. Lookups outside
/// `[start, end]` fail with [`ForcingError::Exhausted`]; values are never
/// extrapolated.
///
/// # Examples
///
/// ```
/// use coltrane_forcing::{Forcing, ForcingError, ForcingSeries};
///
/// let series = ForcingSeries::new(
///     vec![0.0, 10.0, 20.0],
///     vec![0.0, 2.0, 4.0],
///     vec![1.0, 1.0, 3.0],
/// ).unwrap();
///
/// assert_eq!(series.temperature_at(5.0).unwrap(), 1.0);
/// assert_eq!(series.food_at(15.0).unwrap(), 2.0);
/// assert!(matches!(series.food_at(21.0), Err(ForcingError::Exhausted { .. })));
/// ```
pub struct ForcingSeries {
    days: Array1<f64>,
    start: f64,
    end: f64,
    temperature: Channel,
    deep_temperature: Option<Channel>,
    food: Channel,
}

impl ForcingSeries {
    /// Builds a series from a time axis and surface temperature and prey samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the columns differ in length, contain non-finite
    /// values, or the axis is not strictly increasing with at least two samples.
    pub fn new(days: Vec<f64>, temperature: Vec<f64>, food: Vec<f64>) -> Result<Self, ForcingError> {
        if days.len() < 2 {
            return Err(ForcingError::TooFewSamples(days.len()));
        }
        check_column("days", &days, days.len())?;
        check_column("temperature", &temperature, days.len())?;
        check_column("food", &food, days.len())?;

        let days = Array1::from(days);
        let temperature = channel(&days, temperature)?;
        let food = channel(&days, food)?;

        Ok(Self {
            start: days[0],
            end: days[days.len() - 1],
            days,
            temperature,
            deep_temperature: None,
            food,
        })
    }

    /// Adds a separate temperature channel for animals at diapause depth.
    ///
    /// The samples must align with the series' existing time axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the column length differs from the axis or contains
    /// non-finite values.
    pub fn with_deep_temperature(mut self, deep: Vec<f64>) -> Result<Self, ForcingError> {
        check_column("deep_temperature", &deep, self.days.len())?;
        self.deep_temperature = Some(channel(&self.days, deep)?);
        Ok(self)
    }

    /// Repeats one model year of evenly spaced samples for `years` years.
    ///
    /// Sample `i` of the cycle lands on day `i * 365 / n`, where `n` is the
    /// cycle length, and the pattern is tiled end to end. The result covers
    /// `[0, years * 365 - 365 / n]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cycle or `years` is empty, the channels differ
    /// in length, or any sample is non-finite.
    pub fn from_annual_cycle(
        temperature: &[f64],
        deep_temperature: Option<&[f64]>,
        food: &[f64],
        years: usize,
    ) -> Result<Self, ForcingError> {
        let per_year = temperature.len();
        if per_year == 0 || years == 0 {
            return Err(ForcingError::EmptyCycle);
        }
        check_column("food", food, per_year)?;
        if let Some(deep) = deep_temperature {
            check_column("deep_temperature", deep, per_year)?;
        }

        #[allow(clippy::cast_precision_loss)]
        let spacing = DAYS_PER_YEAR / per_year as f64;
        #[allow(clippy::cast_precision_loss)]
        let days = (0..per_year * years).map(|i| i as f64 * spacing).collect();
        let tile = |cycle: &[f64]| cycle.repeat(years);

        let series = Self::new(days, tile(temperature), tile(food))?;
        match deep_temperature {
            Some(deep) => series.with_deep_temperature(tile(deep)),
            None => Ok(series),
        }
    }

    /// First covered day.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Last covered day.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Number of samples on the time axis.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Always `false`: a series holds at least two samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn sample(&self, channel: &Channel, day: f64) -> Result<f64, ForcingError> {
        if day.is_nan() || day < self.start || day > self.end {
            return Err(ForcingError::Exhausted {
                day,
                start: self.start,
                end: self.end,
            });
        }
        Ok(channel.interpolate(&[day])?)
    }
}

impl Forcing for ForcingSeries {
    fn temperature_at(&self, day: f64) -> Result<f64, ForcingError> {
        self.sample(&self.temperature, day)
    }

    fn food_at(&self, day: f64) -> Result<f64, ForcingError> {
        self.sample(&self.food, day)
    }

    fn deep_temperature_at(&self, day: f64) -> Result<f64, ForcingError> {
        self.sample(self.deep_temperature.as_ref().unwrap_or(&self.temperature), day)
    }
}

impl fmt::Debug for ForcingSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForcingSeries")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("len", &self.days.len())
            .field("deep_temperature", &self.deep_temperature.is_some())
            .finish_non_exhaustive()
    }
}

fn check_column(series: &'static str, values: &[f64], expected: usize) -> Result<(), ForcingError> {
    if values.len() != expected {
        return Err(ForcingError::LengthMismatch {
            series,
            expected,
            actual: values.len(),
        });
    }
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(ForcingError::NonFinite { series, index }),
        None => Ok(()),
    }
}

fn channel(axis: &Array1<f64>, values: Vec<f64>) -> Result<Channel, ForcingError> {
    Ok(Channel::new(
        axis.clone(),
        Array1::from(values),
        Linear,
        Extrapolate::Error,
    )?)
}
