//! Core traits and types for the Coltrane crates.
//!
//! This crate defines the abstractions that the forcing and cohort crates
//! build on:
//!
//! - [`Model`]: a deterministic callable that maps a typed input to a typed output
//! - [`Observer`]: receives events emitted while a simulation advances
//! - [`StepIntegrable`]: a state that can be advanced by an explicit step
//! - [`Calendar`]: the model day axis and its mapping onto civil dates

mod calendar;
mod model;
mod observer;
mod step;

pub use calendar::{Calendar, CalendarError, DAYS_PER_YEAR, yearday};
pub use model::Model;
pub use observer::Observer;
pub use step::{DerivativeOf, StepIntegrable};
