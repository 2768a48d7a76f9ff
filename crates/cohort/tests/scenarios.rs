use approx::assert_relative_eq;
use coltrane_cohort::{
    DevelopmentLevel, LifeStrategy, Milestone, Outcome, Params, Phase, Stage,
    TemperatureResponse, TerminationReason, metrics, run,
};
use coltrane_forcing::ConstantForcing;

/// Warm water with effectively unlimited prey.
fn rich() -> ConstantForcing {
    ConstantForcing::new(5.0, 1000.0).with_deep_temperature(-1.5)
}

fn day_of(milestone: Milestone) -> f64 {
    milestone.day().expect("milestone was not reached")
}

#[test]
fn rich_conditions_without_diapause_reproduce() {
    let params = Params::new(365.0);

    let outcome = run(0.0, &LifeStrategy::no_diapause(), &params, &rich(), false).unwrap();

    assert!(outcome.viable);
    assert_eq!(outcome.termination, TerminationReason::Reproduced);
    assert!(outcome.fitness.egg_output > 0.0);
    assert!(outcome.fitness.offspring > 0.0);
    assert!(day_of(outcome.timing.egg_date) < 365.0);
    assert!(day_of(outcome.timing.maturity) <= day_of(outcome.timing.egg_date));
    assert_eq!(outcome.timing.diapause_entry, Milestone::NotReached);

    let adult = outcome.fitness.adult.expect("reproduction began");
    assert!(adult.weight > params.egg_weight());
    assert!(outcome.fitness.capital_fraction > 0.0 && outcome.fitness.capital_fraction <= 1.0);
    let centroid = outcome.fitness.egg_centroid.unwrap();
    assert!(centroid >= day_of(outcome.timing.egg_date) - 1.0);
    assert!(centroid <= day_of(outcome.timing.termination));
}

#[test]
fn no_food_starves_before_maturity() {
    let params = Params::new(365.0);
    let forcing = ConstantForcing::new(5.0, 0.0);

    let outcome = run(0.0, &LifeStrategy::no_diapause(), &params, &forcing, true).unwrap();

    assert!(!outcome.viable);
    assert_eq!(outcome.termination, TerminationReason::Starvation);
    assert_eq!(outcome.timing.maturity, Milestone::NotReached);
    assert_eq!(outcome.timing.egg_date, Milestone::NotReached);
    assert!(outcome.final_state.development < 1.0);

    let trajectory = outcome.trajectory.unwrap();
    assert!(trajectory.iter().all(|record| record.state.reserve >= 0.0));
    assert_eq!(
        trajectory.last().map(|record| record.phase),
        Some(Phase::Terminated(TerminationReason::Starvation))
    );
}

#[test]
fn entry_date_before_spawn_fails_on_the_first_step() {
    let params = Params::new(365.0);
    let strategy = LifeStrategy::with_diapause(50.0, 300.0);

    let outcome = run(100.0, &strategy, &params, &rich(), false).unwrap();

    assert!(!outcome.viable);
    assert_eq!(outcome.termination, TerminationReason::FailedEntryCondition);
    assert_eq!(outcome.steps, 1);
    assert_eq!(
        outcome.timing.termination,
        Milestone::Reached {
            day: 101.0,
            step: 1
        }
    );
    assert_eq!(outcome.timing.diapause_entry, Milestone::NotReached);
}

#[test]
fn exit_after_horizon_stays_in_diapause() {
    let params = Params::new(90.0);
    let strategy = LifeStrategy::with_diapause(50.0, 500.0).with_egg_date(1000.0);

    let outcome = run(0.0, &strategy, &params, &rich(), true).unwrap();

    assert!(!outcome.viable);
    assert_eq!(outcome.termination, TerminationReason::HorizonReached);
    assert_eq!(
        outcome.timing.diapause_entry,
        Milestone::Reached { day: 50.0, step: 50 }
    );
    assert_eq!(outcome.timing.diapause_exit, Milestone::NotReached);
    assert_eq!(
        outcome.timing.get(metrics::DIAPAUSE_EXIT),
        Some(Milestone::NotReached)
    );

    // Development is frozen and reserve spent while dormant.
    let trajectory = outcome.trajectory.unwrap();
    let dormant: Vec<_> = trajectory
        .iter()
        .filter(|record| record.phase == Phase::Diapause)
        .collect();
    assert!(!dormant.is_empty());
    for pair in dormant.windows(2) {
        assert_relative_eq!(pair[1].state.development, pair[0].state.development);
        assert!(pair[1].state.reserve < pair[0].state.reserve);
        assert_relative_eq!(pair[1].state.ln_survival, pair[0].state.ln_survival);
    }
}

#[test]
fn reserve_runs_out_in_warm_diapause() {
    let forcing = ConstantForcing::new(5.0, 1000.0).with_deep_temperature(10.0);
    let strategy = LifeStrategy::with_diapause(50.0, 1900.0);

    let outcome = run(0.0, &strategy, &Params::new(365.0), &forcing, true).unwrap();

    assert!(!outcome.viable);
    assert_eq!(outcome.termination, TerminationReason::StarvationInDiapause);
    assert_eq!(
        outcome.timing.diapause_entry,
        Milestone::Reached { day: 50.0, step: 50 }
    );
    assert_eq!(outcome.timing.diapause_exit, Milestone::NotReached);
    assert_eq!(outcome.timing.egg_date, Milestone::NotReached);
    assert!(day_of(outcome.timing.termination) < 365.0);
    assert_eq!(outcome.fitness.level, DevelopmentLevel::Consistent);

    let trajectory = outcome.trajectory.unwrap();
    assert!(trajectory.iter().all(|record| record.state.reserve >= 0.0));
    let (last, dormant) = trajectory.split_last().unwrap();
    assert_eq!(last.state, dormant[dormant.len() - 1].state);
    assert_eq!(dormant[dormant.len() - 1].phase, Phase::Diapause);
}

#[test]
fn summary_statistics_follow_the_life_cycle() {
    let params = Params::new(365.0);

    let outcome = run(0.0, &LifeStrategy::no_diapause(), &params, &rich(), false).unwrap();
    let fitness = &outcome.fitness;

    assert_eq!(fitness.level, DevelopmentLevel::Adult);
    let stages: Vec<_> = fitness.stage_sizes.keys().copied().collect();
    assert_eq!(stages, [Stage::C1, Stage::C2, Stage::C3, Stage::C4, Stage::C5]);
    let weights: Vec<_> = fitness.stage_sizes.values().map(|size| size.weight).collect();
    assert!(weights.windows(2).all(|pair| pair[0] < pair[1]));

    // Spring spawning reproduces before the first winter.
    assert_eq!(fitness.winter_development, None);
    assert_eq!(fitness.winter_late_stage, None);

    let egg_date = day_of(outcome.timing.egg_date);
    let gain = fitness.gain_centroid.unwrap();
    assert!(gain > 0.0 && gain < egg_date);
    let eaten = fitness.yield_centroid.unwrap();
    assert!(fitness.late_stage_yield_centroid.unwrap() > eaten);
    assert!(fitness.lipid_yield_centroid.unwrap() > eaten);
}

#[test]
fn trajectory_flag_changes_nothing_else() {
    let params = Params::new(365.0);
    let strategy = LifeStrategy::no_diapause().with_egg_date(120.0);

    let summary = run(0.0, &strategy, &params, &rich(), false).unwrap();
    let detailed = run(0.0, &strategy, &params, &rich(), true).unwrap();

    assert!(summary.trajectory.is_none());
    assert!(detailed.trajectory.is_some());
    assert_eq!(summary.timing, detailed.timing);
    assert_eq!(summary.viable, detailed.viable);
    assert_eq!(summary.fitness, detailed.fitness);
    assert_eq!(
        Outcome {
            trajectory: None,
            ..detailed
        },
        summary
    );

    let json = serde_json::to_string(&summary).unwrap();
    assert!(!json.contains("trajectory"));
}

#[test]
fn identical_inputs_give_identical_records() {
    let params = Params::new(400.0);
    let strategy = LifeStrategy::with_diapause(60.0, 200.0);

    let first = run(3.0, &strategy, &params, &rich(), true).unwrap();
    let second = run(3.0, &strategy, &params, &rich(), true).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn late_maturity_delays_reproduction_past_the_egg_date() {
    let params = Params::new(365.0);
    let strategy = LifeStrategy::no_diapause().with_egg_date(20.0);

    let outcome = run(0.0, &strategy, &params, &rich(), false).unwrap();

    let actual = day_of(outcome.timing.egg_date);
    assert_relative_eq!(actual, day_of(outcome.timing.maturity));
    assert_eq!(outcome.timing.egg_date_nominal, Some(20.0));
    assert_relative_eq!(outcome.timing.reproduction_delay.unwrap(), actual - 20.0);
    assert!(actual > 20.0);
}

#[test]
fn egg_date_holds_mature_adults_back() {
    let params = Params::new(365.0);
    let strategy = LifeStrategy::no_diapause().with_egg_date(90.0);

    let outcome = run(0.0, &strategy, &params, &rich(), false).unwrap();

    assert!(day_of(outcome.timing.maturity) < 90.0);
    assert_eq!(
        outcome.timing.egg_date,
        Milestone::Reached { day: 90.0, step: 90 }
    );
    assert!(outcome.viable);
}

#[test]
fn diapause_round_trip_then_reproduce() {
    let params = Params::new(365.0);
    let strategy = LifeStrategy::with_diapause(50.0, 150.0);

    let outcome = run(0.0, &strategy, &params, &rich(), false).unwrap();

    assert_relative_eq!(day_of(outcome.timing.diapause_entry), 50.0);
    assert_relative_eq!(day_of(outcome.timing.diapause_exit), 150.0);
    assert!(day_of(outcome.timing.egg_date) > 150.0);
    assert!(outcome.viable);
}

#[test]
fn multi_clutch_spawns_for_the_whole_season() {
    let mut params = Params::new(365.0);
    params.multi_clutch = true;
    params.spawning_days = 30.0;

    let outcome = run(0.0, &LifeStrategy::no_diapause(), &params, &rich(), false).unwrap();

    assert!(outcome.viable);
    assert_relative_eq!(
        day_of(outcome.timing.termination) - day_of(outcome.timing.egg_date),
        30.0
    );
}

#[test]
fn incubation_holds_the_egg_until_enough_degree_days() {
    let mut params = Params::new(60.0);
    params.egg_degree_days = 50.0;

    let outcome = run(0.0, &LifeStrategy::no_diapause(), &params, &rich(), true).unwrap();
    let trajectory = outcome.trajectory.unwrap();

    assert!(trajectory[..10].iter().all(|record| record.phase == Phase::Egg));
    assert!(trajectory[..10].iter().all(|record| record.state.development == 0.0));
    assert_eq!(
        trajectory[10].phase,
        Phase::Active {
            post_diapause: false
        }
    );
}

#[test]
fn development_response_is_pluggable() {
    let q10 = Params::new(365.0);
    let mut belehradek = q10.clone();
    belehradek.development_response = TemperatureResponse::Belehradek {
        alpha: -9.11,
        exponent: 2.05,
        reference: 0.0,
    };

    let strategy = LifeStrategy::no_diapause();
    let slow = run(0.0, &strategy, &q10, &rich(), false).unwrap();
    let fast = run(0.0, &strategy, &belehradek, &rich(), false).unwrap();

    assert!(day_of(fast.timing.maturity) < day_of(slow.timing.maturity));
}
