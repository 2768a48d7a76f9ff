use coltrane_core::{DerivativeOf, Model, StepIntegrable};
use coltrane_forcing::{Forcing, ForcingError};

use crate::{
    Params, Phase, PhysiologicalState,
    physiology::{Conditions, Physiology},
};

/// Negative reserve within this fraction of weight is round-off, not starvation.
const ROUND_OFF: f64 = 1e-12;

/// Result of advancing a cohort by one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Advance {
    /// The step completed.
    Stepped {
        state: PhysiologicalState,
        /// Rates the step was taken with.
        rates: DerivativeOf<PhysiologicalState, f64>,
    },
    /// The step would have driven the reserve negative.
    Starved,
}

/// Advances a physiological state by explicit steps of fixed length.
pub(crate) struct Integrator<'a, F: ?Sized> {
    physiology: Physiology<'a, F>,
    params: &'a Params,
}

impl<'a, F: Forcing + ?Sized> Integrator<'a, F> {
    pub fn new(params: &'a Params, forcing: &'a F) -> Self {
        Self {
            physiology: Physiology::new(params, forcing),
            params,
        }
    }

    /// Advances `state` by one step starting on `day`, under `phase`.
    ///
    /// Forcing is sampled at the start of the step.
    pub fn advance(
        &self,
        phase: Phase,
        state: &PhysiologicalState,
        day: f64,
    ) -> Result<Advance, ForcingError> {
        let dt = self.params.step_days;
        let rates = self.physiology.call(&Conditions {
            phase,
            state: *state,
            day,
            dt,
        })?;

        let mut next = state.step(rates, dt);
        if next.reserve < 0.0 {
            if next.reserve < -ROUND_OFF * state.weight {
                return Ok(Advance::Starved);
            }
            next.weight -= next.reserve;
            next.reserve = 0.0;
        }

        Ok(Advance::Stepped {
            state: self.finalize(next),
            rates,
        })
    }

    /// Caps development at maturity and discards reserve above the cap.
    ///
    /// The discarded mass leaves both reserve and weight, so it is sized to
    /// land the reserve exactly on the cap of the reduced weight.
    fn finalize(&self, mut state: PhysiologicalState) -> PhysiologicalState {
        state.development = state.development.min(1.0);

        let cap = self.params.max_reserve_fraction;
        let excess = state.reserve - cap * state.weight;
        if excess > 0.0 {
            let discard = if cap < 1.0 { excess / (1.0 - cap) } else { excess };
            state.weight -= discard;
            state.reserve -= discard;
        }
        state
    }
}
