//! The model day axis.
//!
//! Model time is a plain `f64` count of days since an origin. Forcing series,
//! spawn dates, and life-strategy dates are all expressed on this axis. A
//! [`Calendar`] ties the axis to a civil date so callers can work with real
//! dates at the edges of the model.

use jiff::{
    Span,
    civil::{Date, date},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the model year, in days.
///
/// Forcing cycles repeat on this period and [`yearday`] folds onto it. Leap
/// days are ignored by the model; [`Calendar`] conversions are exact.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Largest magnitude of a model day accepted for civil conversion.
const MAX_CIVIL_DAYS: f64 = 3_000_000.0;

/// Errors that can occur when converting between model days and civil dates.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("model day {0} is not finite")]
    NonFinite(f64),

    #[error("model day {0} is outside the supported civil range")]
    OutOfRange(f64),

    #[error(transparent)]
    Civil(#[from] jiff::Error),
}

/// Returns the day of the model year (1-based) for a model day.
///
/// Day 0 maps to yearday 1 and the result wraps every [`DAYS_PER_YEAR`] days.
/// Fractional days keep their fraction.
#[must_use]
pub fn yearday(day: f64) -> f64 {
    day.rem_euclid(DAYS_PER_YEAR) + 1.0
}

/// Maps model days onto civil dates.
///
/// # Examples
///
/// ```
/// use coltrane_core::Calendar;
/// use jiff::civil::date;
///
/// let calendar = Calendar::new(date(1996, 1, 1));
///
/// assert_eq!(calendar.day_of(date(1996, 2, 1)).unwrap(), 31.0);
/// assert_eq!(calendar.date_of(31.5).unwrap(), date(1996, 2, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Calendar {
    origin: Date,
}

impl Calendar {
    /// Creates a calendar whose model day 0 is `origin`.
    #[must_use]
    pub fn new(origin: Date) -> Self {
        Self { origin }
    }

    /// Returns the civil date of model day 0.
    #[must_use]
    pub fn origin(&self) -> Date {
        self.origin
    }

    /// Returns the model day of a civil date.
    ///
    /// Dates before the origin map to negative days.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Civil`] if the span cannot be computed.
    pub fn day_of(&self, civil: Date) -> Result<f64, CalendarError> {
        let span = self.origin.until(civil)?;
        Ok(f64::from(span.get_days()))
    }

    /// Returns the civil date containing a model day.
    ///
    /// Fractional days are floored, so day `31.9` falls on the same date as day `31`.
    ///
    /// # Errors
    ///
    /// Returns an error if `day` is non-finite or the resulting date is outside
    /// the civil range.
    pub fn date_of(&self, day: f64) -> Result<Date, CalendarError> {
        if !day.is_finite() {
            return Err(CalendarError::NonFinite(day));
        }
        if day.abs() > MAX_CIVIL_DAYS {
            return Err(CalendarError::OutOfRange(day));
        }

        #[allow(clippy::cast_possible_truncation)]
        let whole = day.floor() as i64;
        let span = Span::new().try_days(whole)?;
        Ok(self.origin.checked_add(span)?)
    }
}

impl Default for Calendar {
    /// A calendar anchored on 1 January 2000.
    fn default() -> Self {
        Self::new(date(2000, 1, 1))
    }
}
