//! Single-cohort engine of the Coltrane copepod life-history model.
//!
//! A cohort is spawned on a model day, follows a [`LifeStrategy`] (when to
//! enter and leave diapause, when to start laying eggs), and is integrated
//! forward with explicit fixed steps against a [`Forcing`] provider until it
//! reproduces, dies, or reaches the horizon. The result of [`run`] is an
//! [`Outcome`]: fitness proxies, a viability flag, the [`TimingMetrics`] of
//! the run, and optionally the full trajectory.
//!
//! The engine is made of a few cooperating parts:
//!
//! - [`Params`]: the paramosome of physiological constants and policy flags
//! - [`Phase`]: the developmental state machine and its pure transition function
//! - the state integrator, which selects the physiology from the phase
//! - observers that extract [`TimingMetrics`] and [`Fitness`] from each step
//!
//! Biological failures are data: [`run`] only returns an error for an invalid
//! configuration.
//!
//! # Example
//!
//! ```
//! use coltrane_cohort::{LifeStrategy, Params, TerminationReason, run};
//! use coltrane_forcing::ConstantForcing;
//!
//! let params = Params::new(730.0);
//! let forcing = ConstantForcing::new(4.0, 10.0);
//!
//! let outcome = run(0.0, &LifeStrategy::no_diapause(), &params, &forcing, false)?;
//!
//! assert!(outcome.viable);
//! assert_eq!(outcome.termination, TerminationReason::Reproduced);
//! assert!(outcome.trajectory.is_none());
//! # Ok::<(), coltrane_cohort::ConfigError>(())
//! ```
//!
//! [`Forcing`]: coltrane_forcing::Forcing

mod error;
mod integrator;
pub mod metrics;
mod outcome;
mod params;
mod phase;
mod physiology;
mod run;
mod stage;
mod state;
mod strategy;

pub use error::ConfigError;
pub use metrics::{Milestone, TimingMetrics};
pub use outcome::{AdultSize, DevelopmentLevel, Fitness, MeanSize, Outcome, Record, StepEvent};
pub use params::{MAX_STEPS, Params, PreyResponse, TemperatureResponse};
pub use phase::{Phase, TerminationReason};
pub use run::run;
pub use stage::Stage;
pub use state::{PhysiologicalState, Rates};
pub use strategy::LifeStrategy;
