use coltrane_core::StepIntegrable;
use serde::{Deserialize, Serialize};

use crate::{Params, Stage};

/// Physiological state of a cohort at one point on the clock.
///
/// `weight` is total mass, structure plus `reserve`. Survival is carried as
/// its logarithm so that long runs under high mortality stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysiologicalState {
    /// Development from spawning (0) to the adult moult (1).
    pub development: f64,
    /// Total weight (µgC).
    pub weight: f64,
    /// Lipid reserve (µgC), never negative.
    pub reserve: f64,
    /// Natural log of the surviving fraction of the cohort.
    pub ln_survival: f64,
    /// Incubation degree-days accumulated since spawning.
    pub degree_days: f64,
    /// Cumulative egg output per individual (µgC).
    pub egg_output: f64,
    /// Part of `egg_output` drawn from reserve rather than current intake.
    pub capital_eggs: f64,
    /// Expected offspring per spawned individual (`F1`).
    pub offspring: f64,
}

impl PhysiologicalState {
    /// State of a newly spawned cohort.
    #[must_use]
    pub fn at_spawn(params: &Params) -> Self {
        let weight = params.egg_weight();
        Self {
            development: 0.0,
            weight,
            reserve: params.initial_reserve_fraction * weight,
            ln_survival: 0.0,
            degree_days: 0.0,
            egg_output: 0.0,
            capital_eggs: 0.0,
            offspring: 0.0,
        }
    }

    /// Surviving fraction of the cohort.
    #[must_use]
    pub fn survival(&self) -> f64 {
        self.ln_survival.exp()
    }

    /// Weight excluding reserve.
    #[must_use]
    pub fn structure(&self) -> f64 {
        self.weight - self.reserve
    }

    /// Developmental stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        Stage::from_development(self.development)
    }

    /// Whether the adult moult has been reached.
    #[must_use]
    pub fn is_mature(&self) -> bool {
        self.development >= 1.0
    }
}

/// Rates of change of a [`PhysiologicalState`] per day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rates {
    pub development: f64,
    pub weight: f64,
    pub reserve: f64,
    pub mortality: f64,
    pub degree_days: f64,
    pub egg_production: f64,
    pub capital_eggs: f64,
    pub offspring: f64,
    /// Assimilation minus metabolism (µgC/day). Reported only; weight and
    /// reserve carry its effect.
    pub net_gain: f64,
}

impl StepIntegrable<f64> for PhysiologicalState {
    type Derivative = Rates;

    fn step(&self, rates: Rates, days: f64) -> Self {
        Self {
            development: self.development + rates.development * days,
            weight: self.weight + rates.weight * days,
            reserve: self.reserve + rates.reserve * days,
            ln_survival: self.ln_survival - rates.mortality * days,
            degree_days: self.degree_days + rates.degree_days * days,
            egg_output: self.egg_output + rates.egg_production * days,
            capital_eggs: self.capital_eggs + rates.capital_eggs * days,
            offspring: self.offspring + rates.offspring * days,
        }
    }
}
