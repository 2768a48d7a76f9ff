//! Rates of change of the physiological state in each phase.

use coltrane_core::Model;
use coltrane_forcing::{Forcing, ForcingError};

use crate::{Params, Phase, PhysiologicalState, Rates};

/// What the physiology needs to know to produce rates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Conditions {
    pub phase: Phase,
    pub state: PhysiologicalState,
    /// Day at which forcing is sampled.
    pub day: f64,
    /// Step length; bounds how fast reserve can be spent on eggs.
    pub dt: f64,
}

/// Surface conditions as seen by a feeding animal.
#[derive(Debug, Clone, Copy)]
struct Surface {
    temperature: f64,
    saturation: f64,
}

/// The Coltrane physiology evaluated against a forcing provider.
pub(crate) struct Physiology<'a, F: ?Sized> {
    params: &'a Params,
    forcing: &'a F,
    egg_weight: f64,
}

impl<'a, F: Forcing + ?Sized> Physiology<'a, F> {
    pub fn new(params: &'a Params, forcing: &'a F) -> Self {
        Self {
            params,
            forcing,
            egg_weight: params.egg_weight(),
        }
    }

    fn surface(&self, day: f64) -> Result<Surface, ForcingError> {
        Ok(Surface {
            temperature: self.forcing.temperature_at(day)?,
            saturation: self
                .params
                .prey_response
                .saturation(self.forcing.food_at(day)?),
        })
    }

    /// Maximum ingestion per unit weight (1/day).
    fn ingestion_ceiling(&self, state: &PhysiologicalState, temperature: f64) -> f64 {
        let p = self.params;
        p.growth_response.factor(temperature)
            * p.max_ingestion
            * state.weight.powf(p.metabolic_exponent - 1.0)
    }

    /// Net assimilation minus active metabolism (µgC/day).
    fn net_gain(&self, state: &PhysiologicalState, surface: Surface) -> f64 {
        let p = self.params;
        (p.assimilation_efficiency * surface.saturation - p.active_metabolism)
            * self.ingestion_ceiling(state, surface.temperature)
            * state.weight
    }

    fn mortality(&self, state: &PhysiologicalState, temperature: f64) -> f64 {
        let p = self.params;
        p.mortality_rate
            * p.growth_response.factor(temperature)
            * state.weight.powf(p.metabolic_exponent - 1.0)
    }

    /// Fraction of positive gain stored as reserve at development `development`.
    fn storage_fraction(&self, development: f64) -> f64 {
        let onset = self.params.storage_onset;
        ((development - onset) / (1.0 - onset)).clamp(0.0, 1.0)
    }

    fn incubation(&self, state: &PhysiologicalState, temperature: f64) -> Rates {
        Rates {
            degree_days: (temperature - self.params.egg_base_temperature).max(0.0),
            mortality: self.mortality(state, temperature),
            ..Rates::default()
        }
    }

    fn development(&self, state: &PhysiologicalState, surface: Surface) -> Rates {
        let p = self.params;
        let feeding = state.development >= p.first_feeding;
        let food_limitation = if feeding { surface.saturation } else { 1.0 };

        let mut rates = Rates {
            development: p.development_rate
                * p.development_response.factor(surface.temperature)
                * food_limitation,
            mortality: self.mortality(state, surface.temperature),
            ..Rates::default()
        };

        // Non-feeding nauplii live on their yolk at no modelled cost.
        if feeding {
            let gain = self.net_gain(state, surface);
            let stored = if gain < 0.0 {
                1.0
            } else {
                self.storage_fraction(state.development)
            };
            rates.weight = gain;
            rates.reserve = stored * gain;
            rates.net_gain = gain;
        }
        rates
    }

    fn dormancy(&self, state: &PhysiologicalState, temperature: f64) -> Rates {
        let p = self.params;
        let cost = p.active_metabolism
            * p.diapause_metabolism
            * self.ingestion_ceiling(state, temperature)
            * state.weight;
        Rates {
            weight: -cost,
            reserve: -cost,
            net_gain: -cost,
            ..Rates::default()
        }
    }

    fn spawning(&self, state: &PhysiologicalState, surface: Surface, dt: f64) -> Rates {
        let p = self.params;
        let gain = self.net_gain(state, surface);
        let income = gain.max(0.0);
        let loss = gain.min(0.0);

        let ceiling = p.assimilation_efficiency
            * self.ingestion_ceiling(state, surface.temperature)
            * state.weight;
        let available = (state.reserve + loss * dt).max(0.0) / dt;
        let capital = (ceiling - income).max(0.0).min(available);
        let capital_eggs = p.egg_conversion_efficiency * capital;
        let egg_production = income + capital_eggs;

        Rates {
            weight: loss - capital,
            reserve: loss - capital,
            mortality: self.mortality(state, surface.temperature),
            egg_production,
            capital_eggs,
            offspring: egg_production * state.survival() / self.egg_weight,
            net_gain: gain,
            ..Rates::default()
        }
    }
}

impl<F: Forcing + ?Sized> Model for Physiology<'_, F> {
    type Input = Conditions;
    type Output = Rates;
    type Error = ForcingError;

    fn call(&self, input: &Conditions) -> Result<Rates, ForcingError> {
        let Conditions {
            phase,
            ref state,
            day,
            dt,
        } = *input;

        match phase {
            Phase::Egg => Ok(self.incubation(state, self.forcing.temperature_at(day)?)),
            Phase::Active { .. } => Ok(self.development(state, self.surface(day)?)),
            Phase::Diapause => Ok(self.dormancy(state, self.forcing.deep_temperature_at(day)?)),
            Phase::Reproductive { .. } => Ok(self.spawning(state, self.surface(day)?, dt)),
            Phase::Terminated(_) => Ok(Rates::default()),
        }
    }
}
