//! Per-step records and the summary returned by a cohort run.

use std::collections::BTreeMap;

use coltrane_core::{DAYS_PER_YEAR, Observer, yearday};
use serde::{Deserialize, Serialize};

use crate::{Phase, PhysiologicalState, Rates, Stage, TerminationReason, TimingMetrics};

/// Snapshot of a cohort at the end of a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Step index; 0 is the spawn.
    pub step: usize,
    /// Model day at the end of the step.
    pub day: f64,
    pub phase: Phase,
    pub stage: Stage,
    pub state: PhysiologicalState,
    /// Egg production rate over the step that led here (µgC/day).
    pub egg_production: f64,
    /// Assimilation minus metabolism over the step that led here (µgC/day).
    pub net_gain: f64,
    /// Mortality rate over the step that led here (1/day).
    pub mortality: f64,
}

impl Record {
    #[must_use]
    pub fn new(
        step: usize,
        day: f64,
        phase: Phase,
        state: PhysiologicalState,
        rates: &Rates,
    ) -> Self {
        Self {
            step,
            day,
            phase,
            stage: state.stage(),
            state,
            egg_production: rates.egg_production,
            net_gain: rates.net_gain,
            mortality: rates.mortality,
        }
    }
}

/// A completed step, as seen by observers.
///
/// The spawn is reported as a step whose `previous` and `current` are the
/// same record.
#[derive(Debug, Clone, Copy)]
pub struct StepEvent<'a> {
    pub previous: &'a Record,
    pub current: &'a Record,
}

/// Size and condition of the cohort when reproduction began.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdultSize {
    pub weight: f64,
    pub reserve: f64,
    pub survival: f64,
}

/// Mean weight and reserve over a set of records (µgC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanSize {
    pub weight: f64,
    pub reserve: f64,
}

/// How far a cohort got through its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentLevel {
    /// The cohort reached its diapause entry date unable to enter.
    FailedEntry = 0,
    /// The cohort never failed an entry condition but did not mature.
    Consistent = 1,
    /// The cohort reached the adult moult.
    Adult = 2,
}

impl DevelopmentLevel {
    /// Numeric level: 0, 1, or 2.
    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Fitness proxies and summary statistics of a cohort run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    /// Total egg output per individual (µgC).
    pub egg_output: f64,
    /// Expected offspring per spawned individual (`F1`).
    pub offspring: f64,
    /// Share of egg output drawn from reserve; 0 without output.
    pub capital_fraction: f64,
    /// Surviving fraction at the end of the run.
    pub survival: f64,
    /// Condition at the onset of reproduction, if it began.
    pub adult: Option<AdultSize>,
    /// Offspring-weighted mean day of egg production.
    pub egg_centroid: Option<f64>,
    /// Days from spawning to the egg centroid.
    pub generation_length: Option<f64>,
    pub level: DevelopmentLevel,
    /// Development on the first 31 December after spawning, if the run got there.
    pub winter_development: Option<f64>,
    /// Mean size while in each copepodite stage C1 to C5 that was observed.
    pub stage_sizes: BTreeMap<Stage, MeanSize>,
    /// Mean size of late copepodites and adults between November and February.
    pub winter_late_stage: Option<MeanSize>,
    /// Mean day of positive net gain, weighted by survivors.
    pub gain_centroid: Option<f64>,
    /// Mean day of biomass lost to predation.
    pub yield_centroid: Option<f64>,
    /// Mean day of reserve lost to predation.
    pub lipid_yield_centroid: Option<f64>,
    /// Mean day of late copepodite and adult biomass lost to predation.
    pub late_stage_yield_centroid: Option<f64>,
}

/// Late copepodites start halfway between the C4 and C5 midpoints.
fn late_stage_onset() -> f64 {
    0.5 * (Stage::C4.midpoint() + Stage::C5.midpoint())
}

/// Development window attributed to a stage: from halfway to the previous
/// stage's midpoint to halfway to the next one's.
fn stage_window(stage: Stage) -> Option<(f64, f64)> {
    let index = stage as usize;
    let previous = Stage::ALL.get(index.checked_sub(1)?)?;
    let next = Stage::ALL.get(index + 1)?;
    Some((
        0.5 * (previous.midpoint() + stage.midpoint()),
        0.5 * (stage.midpoint() + next.midpoint()),
    ))
}

/// The copepodite stage whose window contains `development`.
fn windowed_copepodite(development: f64) -> Option<Stage> {
    [Stage::C1, Stage::C2, Stage::C3, Stage::C4, Stage::C5]
        .into_iter()
        .find(|&stage| {
            stage_window(stage).is_some_and(|(low, high)| (low..high).contains(&development))
        })
}

/// Nov 1 through Feb 28 of the 365-day model year.
fn is_winter(day: f64) -> bool {
    let yearday = yearday(day);
    yearday >= 305.0 || yearday < 60.0
}

/// Weighted mean of days.
#[derive(Debug, Clone, Copy, Default)]
struct Centroid {
    weighted_days: f64,
    total: f64,
}

impl Centroid {
    fn add(&mut self, day: f64, weight: f64) {
        if weight > 0.0 {
            self.weighted_days += day * weight;
            self.total += weight;
        }
    }

    fn day(self) -> Option<f64> {
        (self.total > 0.0).then(|| self.weighted_days / self.total)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SizeSum {
    weight: f64,
    reserve: f64,
    count: u32,
}

impl SizeSum {
    fn add(&mut self, state: &PhysiologicalState) {
        self.weight += state.weight;
        self.reserve += state.reserve;
        self.count += 1;
    }

    fn mean(self) -> Option<MeanSize> {
        let n = f64::from(self.count);
        (self.count > 0).then(|| MeanSize {
            weight: self.weight / n,
            reserve: self.reserve / n,
        })
    }
}

/// Observer that accumulates what [`Fitness`] needs beyond the final state.
///
/// Quantities produced over a step are dated to its start and weighted by
/// the survivors at that start.
#[derive(Debug, Clone)]
pub(crate) struct FitnessTracker {
    spawn_day: f64,
    winter_day: f64,
    adult: Option<AdultSize>,
    eggs: Centroid,
    gain: Centroid,
    predation: Centroid,
    lipid_predation: Centroid,
    late_stage_predation: Centroid,
    failed_entry: bool,
    matured: bool,
    winter_development: Option<f64>,
    stage_sizes: BTreeMap<Stage, SizeSum>,
    winter_late_stage: SizeSum,
}

impl FitnessTracker {
    pub fn new(spawn_day: f64) -> Self {
        Self {
            spawn_day,
            winter_day: spawn_day + DAYS_PER_YEAR - yearday(spawn_day),
            adult: None,
            eggs: Centroid::default(),
            gain: Centroid::default(),
            predation: Centroid::default(),
            lipid_predation: Centroid::default(),
            late_stage_predation: Centroid::default(),
            failed_entry: false,
            matured: false,
            winter_development: None,
            stage_sizes: BTreeMap::new(),
            winter_late_stage: SizeSum::default(),
        }
    }

    pub fn finish(self, last: &PhysiologicalState) -> Fitness {
        let egg_centroid = self.eggs.day();
        let capital_fraction = if last.egg_output > 0.0 {
            last.capital_eggs / last.egg_output
        } else {
            0.0
        };
        let level = if self.matured {
            DevelopmentLevel::Adult
        } else if self.failed_entry {
            DevelopmentLevel::FailedEntry
        } else {
            DevelopmentLevel::Consistent
        };

        Fitness {
            egg_output: last.egg_output,
            offspring: last.offspring,
            capital_fraction,
            survival: last.survival(),
            adult: self.adult,
            egg_centroid,
            generation_length: egg_centroid.map(|day| day - self.spawn_day),
            level,
            winter_development: self.winter_development,
            stage_sizes: self
                .stage_sizes
                .into_iter()
                .filter_map(|(stage, sum)| Some((stage, sum.mean()?)))
                .collect(),
            winter_late_stage: self.winter_late_stage.mean(),
            gain_centroid: self.gain.day(),
            yield_centroid: self.predation.day(),
            lipid_yield_centroid: self.lipid_predation.day(),
            late_stage_yield_centroid: self.late_stage_predation.day(),
        }
    }
}

impl Observer<StepEvent<'_>> for FitnessTracker {
    fn observe(&mut self, event: &StepEvent<'_>) {
        let StepEvent { previous, current } = *event;
        let state = &current.state;

        if self.adult.is_none() && matches!(current.phase, Phase::Reproductive { .. }) {
            self.adult = Some(AdultSize {
                weight: state.weight,
                reserve: state.reserve,
                survival: state.survival(),
            });
        }
        self.matured |= state.is_mature();
        self.failed_entry |=
            current.phase.termination() == Some(TerminationReason::FailedEntryCondition);
        if self.winter_development.is_none() && current.day >= self.winter_day {
            self.winter_development = Some(state.development);
        }

        let produced = current.state.offspring - previous.state.offspring;
        self.eggs.add(previous.day, produced);

        let dt = current.day - previous.day;
        let at_start = &previous.state;
        let survivors = at_start.survival() * dt;
        let eaten = current.mortality * survivors;
        self.gain.add(previous.day, current.net_gain.max(0.0) * survivors);
        self.predation.add(previous.day, eaten * at_start.weight);
        self.lipid_predation.add(previous.day, eaten * at_start.reserve);
        if at_start.development >= late_stage_onset() {
            self.late_stage_predation.add(previous.day, eaten * at_start.weight);
        }

        if current.phase.is_terminated() {
            return;
        }
        if let Some(stage) = windowed_copepodite(state.development) {
            self.stage_sizes.entry(stage).or_default().add(state);
        }
        if state.development >= late_stage_onset() && is_winter(current.day) {
            self.winter_late_stage.add(state);
        }
    }
}

/// Observer that retains every record when asked to.
#[derive(Debug, Clone)]
pub(crate) struct TrajectoryRecorder {
    records: Option<Vec<Record>>,
}

impl TrajectoryRecorder {
    pub fn new(enabled: bool) -> Self {
        Self {
            records: enabled.then(Vec::new),
        }
    }

    pub fn finish(self) -> Option<Vec<Record>> {
        self.records
    }
}

impl Observer<StepEvent<'_>> for TrajectoryRecorder {
    fn observe(&mut self, event: &StepEvent<'_>) {
        if let Some(records) = &mut self.records {
            records.push(*event.current);
        }
    }
}

/// Everything a caller learns from one cohort run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub spawn_day: f64,
    /// The cohort reproduced with positive egg output.
    pub viable: bool,
    pub termination: TerminationReason,
    pub timing: TimingMetrics,
    pub fitness: Fitness,
    pub final_state: PhysiologicalState,
    pub final_stage: Stage,
    /// Number of steps taken, including the terminating one.
    pub steps: usize,
    /// Every record from spawn to termination, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<Vec<Record>>,
}

impl Outcome {
    /// Summarizes a run from its last record and the observers' results.
    pub(crate) fn summarize(
        spawn_day: f64,
        last: &Record,
        timing: TimingMetrics,
        fitness: FitnessTracker,
        trajectory: TrajectoryRecorder,
    ) -> Self {
        let termination = last
            .phase
            .termination()
            .unwrap_or(TerminationReason::HorizonReached);
        let fitness = fitness.finish(&last.state);

        Self {
            spawn_day,
            viable: termination == TerminationReason::Reproduced && fitness.egg_output > 0.0,
            termination,
            timing,
            fitness,
            final_state: last.state,
            final_stage: last.stage,
            steps: last.step,
            trajectory: trajectory.finish(),
        }
    }
}
