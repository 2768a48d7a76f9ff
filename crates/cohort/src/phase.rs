//! Developmental phases and the transitions between them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{LifeStrategy, Params, PhysiologicalState};

/// Reserve below this fraction of weight counts as spent.
const SPENT_RESERVE: f64 = 1e-9;

/// The developmental phase that selects which physiology applies.
///
/// Phases only move forward: `Egg → Active → (Diapause → Active) →
/// Reproductive → Terminated`, and `Terminated` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Incubating; no feeding and no development.
    Egg,
    /// Developing and feeding. `post_diapause` is set after a diapause.
    Active { post_diapause: bool },
    /// Dormant at depth on reserve alone.
    Diapause,
    /// Producing eggs since day `since`.
    Reproductive { since: f64 },
    /// The run is over.
    Terminated(TerminationReason),
}

/// Why a cohort run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Reserve ran out while active.
    Starvation,
    /// Reserve ran out before the diapause exit date.
    StarvationInDiapause,
    /// The diapause entry date arrived before the entry threshold was met.
    FailedEntryCondition,
    /// Reproduction completed with positive egg output.
    Reproduced,
    /// The clock reached the horizon first.
    HorizonReached,
    /// The forcing had no value for a day the run needed.
    ForcingExhausted,
}

impl TerminationReason {
    /// The reason as a snake-case identifier, as used in serialized records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starvation => "starvation",
            Self::StarvationInDiapause => "starvation_in_diapause",
            Self::FailedEntryCondition => "failed_entry_condition",
            Self::Reproduced => "reproduced",
            Self::HorizonReached => "horizon_reached",
            Self::ForcingExhausted => "forcing_exhausted",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Phase {
    /// Phase of a newly spawned cohort.
    #[must_use]
    pub fn at_spawn(params: &Params) -> Self {
        if params.incubates() {
            Self::Egg
        } else {
            Self::Active {
                post_diapause: false,
            }
        }
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }

    /// Returns the termination reason, if any.
    #[must_use]
    pub fn termination(&self) -> Option<TerminationReason> {
        match *self {
            Self::Terminated(reason) => Some(reason),
            _ => None,
        }
    }

    /// Evaluates the transitions due at the end of a step.
    ///
    /// `state` is the state reached by the step and `day` is the date at
    /// which the step ends. Reproduction takes precedence over diapause entry
    /// when both are due.
    #[must_use]
    pub fn transition(
        self,
        state: &PhysiologicalState,
        day: f64,
        strategy: &LifeStrategy,
        params: &Params,
    ) -> Self {
        match self {
            Self::Egg => {
                if strategy.entry_due(day) {
                    Self::Terminated(TerminationReason::FailedEntryCondition)
                } else if state.degree_days >= params.egg_degree_days {
                    Self::Active {
                        post_diapause: false,
                    }
                } else {
                    self
                }
            }
            Self::Active { post_diapause } => {
                if state.is_mature() && strategy.egg_due(day) {
                    Self::Reproductive { since: day }
                } else if !post_diapause && strategy.entry_due(day) {
                    if entry_threshold_met(state, params) {
                        Self::Diapause
                    } else {
                        Self::Terminated(TerminationReason::FailedEntryCondition)
                    }
                } else {
                    self
                }
            }
            Self::Diapause => {
                if strategy.exit_due(day) {
                    Self::Active {
                        post_diapause: true,
                    }
                } else {
                    self
                }
            }
            Self::Reproductive { since } => {
                let complete = if params.multi_clutch {
                    day - since >= params.spawning_days
                } else {
                    state.egg_output > 0.0 && state.reserve <= SPENT_RESERVE * state.weight
                };
                if complete {
                    Self::Terminated(TerminationReason::Reproduced)
                } else {
                    self
                }
            }
            Self::Terminated(_) => self,
        }
    }

    /// The phase reached when a step would have driven the reserve negative.
    ///
    /// A reproducing cohort that has already produced eggs ends as reproduced.
    #[must_use]
    pub fn starved(self, state: &PhysiologicalState) -> Self {
        let reason = match self {
            Self::Diapause => TerminationReason::StarvationInDiapause,
            Self::Reproductive { .. } if state.egg_output > 0.0 => TerminationReason::Reproduced,
            Self::Terminated(_) => return self,
            _ => TerminationReason::Starvation,
        };
        Self::Terminated(reason)
    }

    /// The phase recorded when the clock reaches the horizon.
    #[must_use]
    pub fn at_horizon(self) -> Self {
        match self {
            Self::Terminated(_) => self,
            _ => Self::Terminated(TerminationReason::HorizonReached),
        }
    }
}

fn entry_threshold_met(state: &PhysiologicalState, params: &Params) -> bool {
    !params.require_diapause_threshold
        || (state.development >= params.diapause_development
            && state.reserve >= params.diapause_reserve_fraction * state.weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE: Phase = Phase::Active {
        post_diapause: false,
    };

    fn state(development: f64, reserve: f64) -> PhysiologicalState {
        PhysiologicalState {
            development,
            weight: 100.0,
            reserve,
            ..PhysiologicalState::at_spawn(&Params::new(365.0))
        }
    }

    #[test]
    fn spawn_phase_depends_on_incubation() {
        let mut params = Params::new(365.0);
        assert_eq!(Phase::at_spawn(&params), ACTIVE);

        params.egg_degree_days = 50.0;
        assert_eq!(Phase::at_spawn(&params), Phase::Egg);
    }

    #[test]
    fn egg_hatches_after_its_degree_days() {
        let mut params = Params::new(365.0);
        params.egg_degree_days = 50.0;
        let strategy = LifeStrategy::no_diapause();

        let mut egg = state(0.0, 1.0);
        egg.degree_days = 49.0;
        assert_eq!(Phase::Egg.transition(&egg, 10.0, &strategy, &params), Phase::Egg);

        egg.degree_days = 50.0;
        assert_eq!(Phase::Egg.transition(&egg, 11.0, &strategy, &params), ACTIVE);
    }

    #[test]
    fn entry_date_enters_diapause_when_threshold_met() {
        let params = Params::new(365.0);
        let strategy = LifeStrategy::with_diapause(200.0, 400.0);

        assert_eq!(
            ACTIVE.transition(&state(0.7, 20.0), 199.0, &strategy, &params),
            ACTIVE
        );
        assert_eq!(
            ACTIVE.transition(&state(0.7, 20.0), 200.0, &strategy, &params),
            Phase::Diapause
        );
    }

    #[test]
    fn entry_date_before_threshold_is_infeasible() {
        let mut params = Params::new(365.0);
        let strategy = LifeStrategy::with_diapause(200.0, 400.0);

        assert_eq!(
            ACTIVE.transition(&state(0.4, 20.0), 200.0, &strategy, &params),
            Phase::Terminated(TerminationReason::FailedEntryCondition)
        );

        params.diapause_reserve_fraction = 0.3;
        assert_eq!(
            ACTIVE.transition(&state(0.7, 20.0), 200.0, &strategy, &params),
            Phase::Terminated(TerminationReason::FailedEntryCondition)
        );

        params.require_diapause_threshold = false;
        assert_eq!(
            ACTIVE.transition(&state(0.4, 0.0), 200.0, &strategy, &params),
            Phase::Diapause
        );
    }

    #[test]
    fn diapause_exits_on_date_and_is_not_reentered() {
        let params = Params::new(365.0);
        let strategy = LifeStrategy::with_diapause(200.0, 400.0);

        let resumed = Phase::Diapause.transition(&state(0.7, 20.0), 400.0, &strategy, &params);
        assert_eq!(
            resumed,
            Phase::Active {
                post_diapause: true
            }
        );
        assert_eq!(
            resumed.transition(&state(0.8, 20.0), 401.0, &strategy, &params),
            resumed
        );
    }

    #[test]
    fn reproduction_waits_for_maturity_and_egg_date() {
        let params = Params::new(365.0);
        let strategy = LifeStrategy::no_diapause().with_egg_date(300.0);

        assert_eq!(
            ACTIVE.transition(&state(1.0, 20.0), 250.0, &strategy, &params),
            ACTIVE
        );
        assert_eq!(
            ACTIVE.transition(&state(0.99, 20.0), 310.0, &strategy, &params),
            ACTIVE
        );
        assert_eq!(
            ACTIVE.transition(&state(1.0, 20.0), 310.0, &strategy, &params),
            Phase::Reproductive { since: 310.0 }
        );
    }

    #[test]
    fn reproduction_takes_precedence_over_entry() {
        let params = Params::new(365.0);
        let strategy = LifeStrategy::with_diapause(200.0, 400.0);

        assert_eq!(
            ACTIVE.transition(&state(1.0, 20.0), 200.0, &strategy, &params),
            Phase::Reproductive { since: 200.0 }
        );
    }

    #[test]
    fn single_clutch_ends_when_reserve_is_spent() {
        let params = Params::new(365.0);
        let strategy = LifeStrategy::no_diapause();
        let reproductive = Phase::Reproductive { since: 100.0 };

        let mut spawning = state(1.0, 5.0);
        spawning.egg_output = 3.0;
        assert_eq!(
            reproductive.transition(&spawning, 101.0, &strategy, &params),
            reproductive
        );

        spawning.reserve = 0.0;
        assert_eq!(
            reproductive.transition(&spawning, 102.0, &strategy, &params),
            Phase::Terminated(TerminationReason::Reproduced)
        );
    }

    #[test]
    fn multi_clutch_ends_after_the_spawning_season() {
        let mut params = Params::new(365.0);
        params.multi_clutch = true;
        params.spawning_days = 30.0;
        let strategy = LifeStrategy::no_diapause();
        let reproductive = Phase::Reproductive { since: 100.0 };

        let mut spawning = state(1.0, 0.0);
        spawning.egg_output = 3.0;
        assert_eq!(
            reproductive.transition(&spawning, 129.0, &strategy, &params),
            reproductive
        );
        assert_eq!(
            reproductive.transition(&spawning, 130.0, &strategy, &params),
            Phase::Terminated(TerminationReason::Reproduced)
        );
    }

    #[test]
    fn starvation_reason_depends_on_phase() {
        let hungry = state(0.5, 0.0);
        let mut spent = state(1.0, 0.0);
        spent.egg_output = 2.0;

        assert_eq!(
            ACTIVE.starved(&hungry),
            Phase::Terminated(TerminationReason::Starvation)
        );
        assert_eq!(
            Phase::Diapause.starved(&hungry),
            Phase::Terminated(TerminationReason::StarvationInDiapause)
        );
        assert_eq!(
            Phase::Reproductive { since: 0.0 }.starved(&spent),
            Phase::Terminated(TerminationReason::Reproduced)
        );
        assert_eq!(
            Phase::Reproductive { since: 0.0 }.starved(&hungry),
            Phase::Terminated(TerminationReason::Starvation)
        );
    }

    #[test]
    fn terminated_is_absorbing() {
        let params = Params::new(365.0);
        let strategy = LifeStrategy::with_diapause(0.0, 1.0);
        let done = Phase::Terminated(TerminationReason::Starvation);

        assert_eq!(done.transition(&state(1.0, 1.0), 500.0, &strategy, &params), done);
        assert_eq!(done.at_horizon(), done);
        assert_eq!(done.starved(&state(1.0, 0.0)), done);
        assert_eq!(
            ACTIVE.at_horizon(),
            Phase::Terminated(TerminationReason::HorizonReached)
        );
    }

    #[test]
    fn reasons_serialize_as_snake_case() {
        for reason in [
            TerminationReason::Starvation,
            TerminationReason::StarvationInDiapause,
            TerminationReason::FailedEntryCondition,
            TerminationReason::Reproduced,
            TerminationReason::HorizonReached,
            TerminationReason::ForcingExhausted,
        ] {
            assert_eq!(
                serde_json::to_string(&reason).unwrap(),
                format!("\"{}\"", reason.as_str())
            );
        }
    }
}
