//! Timing metrics recorded while a cohort run advances.

use coltrane_core::Observer;
use serde::{Deserialize, Serialize};

use crate::{LifeStrategy, Phase, outcome::StepEvent};

/// Date on which diapause began.
pub const DIAPAUSE_ENTRY: &str = "diapause_entry_actual";
/// Date on which diapause ended.
pub const DIAPAUSE_EXIT: &str = "diapause_exit_actual";
/// Date on which development first reached 1.
pub const MATURITY: &str = "maturity_actual";
/// Date on which egg production began.
pub const EGG_DATE: &str = "egg_date_actual";
/// Date on which the run terminated.
pub const TERMINATION: &str = "termination_date";

/// When a timing event happened, or that it never did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Reached {
        day: f64,
        step: usize,
    },
    #[default]
    NotReached,
}

impl Milestone {
    /// The day of the event, if it happened.
    #[must_use]
    pub fn day(&self) -> Option<f64> {
        match *self {
            Self::Reached { day, .. } => Some(day),
            Self::NotReached => None,
        }
    }

    #[must_use]
    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Reached { .. })
    }

    /// Records the event unless it is already recorded.
    fn record(&mut self, day: f64, step: usize) {
        if !self.is_reached() {
            *self = Self::Reached { day, step };
        }
    }
}

/// The realized timing of a cohort run.
///
/// Every metric is always present, as [`Milestone::NotReached`] if the run
/// ended first. Serialized field names are the metric names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingMetrics {
    #[serde(rename = "diapause_entry_actual")]
    pub diapause_entry: Milestone,
    #[serde(rename = "diapause_exit_actual")]
    pub diapause_exit: Milestone,
    #[serde(rename = "maturity_actual")]
    pub maturity: Milestone,
    #[serde(rename = "egg_date_actual")]
    pub egg_date: Milestone,
    #[serde(rename = "termination_date")]
    pub termination: Milestone,
    /// The strategy's target egg date, if it had one.
    pub egg_date_nominal: Option<f64>,
    /// Days by which egg production lagged the nominal egg date.
    ///
    /// `None` unless both the nominal and the actual date exist.
    pub reproduction_delay: Option<f64>,
}

impl TimingMetrics {
    /// Metric names in the order [`TimingMetrics::iter`] yields them.
    pub const NAMES: [&'static str; 5] = [
        DIAPAUSE_ENTRY,
        DIAPAUSE_EXIT,
        MATURITY,
        EGG_DATE,
        TERMINATION,
    ];

    /// Looks up a metric by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Milestone> {
        match name {
            DIAPAUSE_ENTRY => Some(self.diapause_entry),
            DIAPAUSE_EXIT => Some(self.diapause_exit),
            MATURITY => Some(self.maturity),
            EGG_DATE => Some(self.egg_date),
            TERMINATION => Some(self.termination),
            _ => None,
        }
    }

    /// Iterates over every named metric.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Milestone)> + '_ {
        Self::NAMES
            .into_iter()
            .filter_map(|name| self.get(name).map(|milestone| (name, milestone)))
    }

    fn delay(&self) -> Option<f64> {
        Some(self.egg_date.day()? - self.egg_date_nominal?)
    }
}

/// Observer that fills in [`TimingMetrics`] from step events.
#[derive(Debug, Clone, Default)]
pub(crate) struct MetricsRecorder {
    metrics: TimingMetrics,
}

impl MetricsRecorder {
    pub fn new(strategy: &LifeStrategy) -> Self {
        Self {
            metrics: TimingMetrics {
                egg_date_nominal: strategy.egg_date,
                ..TimingMetrics::default()
            },
        }
    }

    pub fn finish(self) -> TimingMetrics {
        TimingMetrics {
            reproduction_delay: self.metrics.delay(),
            ..self.metrics
        }
    }
}

impl Observer<StepEvent<'_>> for MetricsRecorder {
    fn observe(&mut self, event: &StepEvent<'_>) {
        let (from, to) = (event.previous.phase, event.current.phase);
        let (day, step) = (event.current.day, event.current.step);
        let m = &mut self.metrics;

        match (from, to) {
            (Phase::Diapause, Phase::Diapause) => {}
            (_, Phase::Diapause) => m.diapause_entry.record(day, step),
            (Phase::Diapause, Phase::Active { .. }) => m.diapause_exit.record(day, step),
            _ => {}
        }
        if event.current.state.is_mature() {
            m.maturity.record(day, step);
        }
        if matches!(to, Phase::Reproductive { .. }) && !matches!(from, Phase::Reproductive { .. }) {
            m.egg_date.record(day, step);
        }
        if to.is_terminated() && !from.is_terminated() {
            m.termination.record(day, step);
        }
    }
}
