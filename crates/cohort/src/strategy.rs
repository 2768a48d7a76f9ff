use coltrane_core::{Calendar, CalendarError};
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, check};

/// The timing decisions under test for one cohort.
///
/// Each date is a model day on the same axis as the spawn day and the forcing.
/// Any date may be absent: a strategy without `diapause_entry` never enters
/// diapause, and a strategy without `egg_date` reproduces as soon as it
/// matures. A strategy is never mutated during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LifeStrategy {
    pub diapause_entry: Option<f64>,
    pub diapause_exit: Option<f64>,
    pub egg_date: Option<f64>,
}

impl LifeStrategy {
    /// A strategy that never diapauses and reproduces at maturity.
    #[must_use]
    pub fn no_diapause() -> Self {
        Self::default()
    }

    /// A strategy that enters diapause on `entry` and leaves it on `exit`.
    #[must_use]
    pub fn with_diapause(entry: f64, exit: f64) -> Self {
        Self {
            diapause_entry: Some(entry),
            diapause_exit: Some(exit),
            egg_date: None,
        }
    }

    /// Sets the earliest day on which eggs may be produced.
    #[must_use]
    pub fn with_egg_date(mut self, day: f64) -> Self {
        self.egg_date = Some(day);
        self
    }

    /// Builds a strategy from civil dates.
    ///
    /// # Errors
    ///
    /// Returns an error if a date cannot be placed on the model day axis.
    pub fn from_calendar(
        calendar: &Calendar,
        diapause_entry: Option<Date>,
        diapause_exit: Option<Date>,
        egg_date: Option<Date>,
    ) -> Result<Self, CalendarError> {
        let day_of = |date: Option<Date>| date.map(|d| calendar.day_of(d)).transpose();

        Ok(Self {
            diapause_entry: day_of(diapause_entry)?,
            diapause_exit: day_of(diapause_exit)?,
            egg_date: day_of(egg_date)?,
        })
    }

    /// Checks that every present date is finite and that exit follows entry.
    ///
    /// # Errors
    ///
    /// Returns the first offending date as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(day) = self.diapause_entry {
            check("diapause_entry", day, true, "finite")?;
        }
        if let Some(day) = self.egg_date {
            check("egg_date", day, true, "finite")?;
        }
        if let Some(exit) = self.diapause_exit {
            let after_entry = self.diapause_entry.is_none_or(|entry| exit > entry);
            check("diapause_exit", exit, after_entry, "after diapause_entry")?;
        }
        Ok(())
    }

    pub(crate) fn entry_due(&self, day: f64) -> bool {
        self.diapause_entry.is_some_and(|entry| day >= entry)
    }

    pub(crate) fn exit_due(&self, day: f64) -> bool {
        self.diapause_exit.is_some_and(|exit| day >= exit)
    }

    pub(crate) fn egg_due(&self, day: f64) -> bool {
        self.egg_date.is_none_or(|egg| day >= egg)
    }
}
