//! Environmental forcing for the Coltrane cohort engine.
//!
//! A cohort only needs to ask "what was the temperature and prey
//! concentration on this model day?". The [`Forcing`] trait captures that
//! question, and this crate provides the providers used in practice:
//!
//! - [`ForcingSeries`]: daily (or any spacing) samples, linearly interpolated,
//!   failing with [`ForcingError::Exhausted`] outside the sampled span
//! - [`ConstantForcing`]: fixed conditions, optionally bounded in time
//! - [`seasonal::disko_bay`]: the Disko Bay seasonal cycle repeated over years

mod constant;
mod error;
pub mod seasonal;
mod series;

pub use constant::ConstantForcing;
pub use error::ForcingError;
pub use series::ForcingSeries;

/// Supplies environmental conditions on the model day axis.
///
/// Providers must be defined over the whole span a caller integrates, or fail
/// explicitly with [`ForcingError::Exhausted`]. They are never asked to
/// extrapolate.
///
/// Implementations are read-only, so a single provider can be shared by any
/// number of concurrent cohort runs.
pub trait Forcing {
    /// Returns the near-surface temperature (°C) experienced by active animals.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider has no value for `day`.
    fn temperature_at(&self, day: f64) -> Result<f64, ForcingError>;

    /// Returns the prey concentration on `day`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider has no value for `day`.
    fn food_at(&self, day: f64) -> Result<f64, ForcingError>;

    /// Returns the temperature (°C) at diapause depth.
    ///
    /// Providers without a separate deep layer use the surface temperature.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider has no value for `day`.
    fn deep_temperature_at(&self, day: f64) -> Result<f64, ForcingError> {
        self.temperature_at(day)
    }
}

impl<F: Forcing + ?Sized> Forcing for &F {
    fn temperature_at(&self, day: f64) -> Result<f64, ForcingError> {
        (**self).temperature_at(day)
    }

    fn food_at(&self, day: f64) -> Result<f64, ForcingError> {
        (**self).food_at(day)
    }

    fn deep_temperature_at(&self, day: f64) -> Result<f64, ForcingError> {
        (**self).deep_temperature_at(day)
    }
}
