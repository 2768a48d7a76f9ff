use coltrane_core::Observer;
use coltrane_forcing::Forcing;
use tracing::{debug, trace};

use crate::{
    ConfigError, LifeStrategy, Outcome, Params, Phase, PhysiologicalState, Rates,
    TerminationReason,
    error::check,
    integrator::{Advance, Integrator},
    metrics::MetricsRecorder,
    outcome::{FitnessTracker, Record, StepEvent, TrajectoryRecorder},
};

/// Runs one cohort from `spawn_day` until it terminates or reaches the horizon.
///
/// Each step samples the forcing at its start, advances the state under the
/// current phase, and then evaluates phase transitions at the step's end
/// date. Every biological ending, including starvation, an infeasible
/// strategy, and running off the end of the forcing, is reported in the
/// returned [`Outcome`]. With `emit_trajectory` the outcome also carries a
/// [`Record`] for every step.
///
/// A step whose forcing lookup fails is not integrated: its record keeps the
/// previous state and is dated to the day the lookup failed.
///
/// The run reads `params`, `strategy`, and `forcing` only, so any number of
/// runs may share them across threads.
///
/// # Errors
///
/// Returns a [`ConfigError`] if `params`, `strategy`, or `spawn_day` is invalid.
pub fn run<F: Forcing + ?Sized>(
    spawn_day: f64,
    strategy: &LifeStrategy,
    params: &Params,
    forcing: &F,
    emit_trajectory: bool,
) -> Result<Outcome, ConfigError> {
    check("spawn_day", spawn_day, true, "finite")?;
    params.validate()?;
    strategy.validate()?;

    let steps = params.step_count();
    let dt = params.step_days;
    let integrator = Integrator::new(params, forcing);
    debug!(spawn_day, steps, dt, ?strategy, "starting cohort run");

    let log_transitions = |event: &StepEvent<'_>| {
        let StepEvent { previous, current } = *event;
        if current.phase != previous.phase {
            trace!(
                step = current.step,
                day = current.day,
                from = ?previous.phase,
                to = ?current.phase,
                "phase transition"
            );
        }
    };
    let mut observers = (
        MetricsRecorder::new(strategy),
        (
            FitnessTracker::new(spawn_day),
            (TrajectoryRecorder::new(emit_trajectory), log_transitions),
        ),
    );

    let mut current = Record::new(
        0,
        spawn_day,
        Phase::at_spawn(params),
        PhysiologicalState::at_spawn(params),
        &Rates::default(),
    );
    observers.observe(&StepEvent {
        previous: &current,
        current: &current,
    });

    for step in 1..=steps {
        if current.phase.is_terminated() {
            break;
        }

        #[allow(clippy::cast_precision_loss)]
        let mut end = spawn_day + step as f64 * dt;
        let (state, rates, mut phase) =
            match integrator.advance(current.phase, &current.state, current.day) {
                Ok(Advance::Stepped { state, rates }) => {
                    let phase = current.phase.transition(&state, end, strategy, params);
                    (state, rates, phase)
                }
                Ok(Advance::Starved) => (
                    current.state,
                    Rates::default(),
                    current.phase.starved(&current.state),
                ),
                Err(error) => {
                    debug!(step, day = current.day, %error, "forcing exhausted");
                    end = current.day;
                    (
                        current.state,
                        Rates::default(),
                        Phase::Terminated(TerminationReason::ForcingExhausted),
                    )
                }
            };
        if step == steps {
            phase = phase.at_horizon();
        }

        let next = Record::new(step, end, phase, state, &rates);
        observers.observe(&StepEvent {
            previous: &current,
            current: &next,
        });
        current = next;
    }

    let (metrics, (fitness, (trajectory, _))) = observers;
    let outcome = Outcome::summarize(spawn_day, &current, metrics.finish(), fitness, trajectory);
    debug!(
        spawn_day,
        steps = outcome.steps,
        termination = %outcome.termination,
        viable = outcome.viable,
        egg_output = outcome.fitness.egg_output,
        "cohort run finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use coltrane_forcing::ConstantForcing;

    use crate::Milestone;

    #[test]
    fn invalid_inputs_are_errors() {
        let forcing = ConstantForcing::new(0.0, 1.0);
        let strategy = LifeStrategy::no_diapause();

        assert!(matches!(
            run(f64::NAN, &strategy, &Params::new(10.0), &forcing, false),
            Err(ConfigError::NonFinite { name: "spawn_day" })
        ));
        assert!(matches!(
            run(0.0, &strategy, &Params::new(-1.0), &forcing, false),
            Err(ConfigError::OutOfRange {
                name: "horizon_days",
                ..
            })
        ));
        assert!(matches!(
            run(
                0.0,
                &LifeStrategy::with_diapause(50.0, 40.0),
                &Params::new(10.0),
                &forcing,
                false
            ),
            Err(ConfigError::OutOfRange {
                name: "diapause_exit",
                ..
            })
        ));
    }

    #[test]
    fn trajectory_covers_spawn_to_termination() {
        let params = Params::new(20.0);
        let forcing = ConstantForcing::new(2.0, 3.0);

        let outcome = run(5.0, &LifeStrategy::no_diapause(), &params, &forcing, true).unwrap();
        let trajectory = outcome.trajectory.as_deref().unwrap();

        assert_eq!(trajectory.len(), 21);
        assert_eq!(trajectory[0].step, 0);
        assert_relative_eq!(trajectory[0].day, 5.0);
        assert_relative_eq!(trajectory[20].day, 25.0);
        assert_eq!(outcome.steps, 20);
        assert_eq!(outcome.termination, TerminationReason::HorizonReached);
        assert_eq!(
            outcome.timing.termination,
            Milestone::Reached { day: 25.0, step: 20 }
        );
        assert_eq!(trajectory[20].state, outcome.final_state);
    }

    #[test]
    fn starvation_keeps_the_last_feasible_state() {
        let mut params = Params::new(200.0);
        params.initial_reserve_fraction = 0.0;
        params.first_feeding = 0.0;
        let forcing = ConstantForcing::new(4.0, 0.0);

        let outcome = run(0.0, &LifeStrategy::no_diapause(), &params, &forcing, true).unwrap();

        assert_eq!(outcome.termination, TerminationReason::Starvation);
        assert_eq!(outcome.steps, 1);
        assert!(!outcome.viable);
        assert!(outcome.final_state.reserve >= 0.0);
    }

    #[test]
    fn exhausted_forcing_is_an_outcome() {
        let params = Params::new(100.0);
        let forcing = ConstantForcing::new(2.0, 3.0).covering(0.0, 30.0);

        let outcome = run(0.0, &LifeStrategy::no_diapause(), &params, &forcing, true).unwrap();

        assert_eq!(outcome.termination, TerminationReason::ForcingExhausted);
        assert!(!outcome.viable);
        assert_eq!(
            outcome.timing.termination,
            Milestone::Reached { day: 31.0, step: 32 }
        );
        let trajectory = outcome.trajectory.as_deref().unwrap();
        // Day 30 is the last covered day; the lookup on day 31 fails.
        assert_relative_eq!(trajectory[31].day, 31.0);
        assert_relative_eq!(trajectory[32].day, 31.0);
        assert_eq!(trajectory[32].state, trajectory[31].state);
    }

    #[test]
    fn oversized_horizons_are_errors_not_panics() {
        let forcing = ConstantForcing::new(5.0, 1000.0);

        for emit_trajectory in [false, true] {
            assert!(matches!(
                run(
                    0.0,
                    &LifeStrategy::no_diapause(),
                    &Params::new(1e20),
                    &forcing,
                    emit_trajectory
                ),
                Err(ConfigError::OutOfRange {
                    name: "horizon_days",
                    ..
                })
            ));
        }
    }
}
