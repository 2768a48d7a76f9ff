//! The paramosome: every physiological constant and policy flag of a run.

mod response;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use response::{PreyResponse, TemperatureResponse};

use crate::error::{ConfigError, check};

/// Most explicit steps a single run may take.
pub const MAX_STEPS: usize = 10_000_000;

/// Parameters of a single cohort run.
///
/// A `Params` value is immutable for the duration of a run and is passed by
/// reference, so concurrent runs can share one instance. Construct it with
/// [`Params::new`], [`Params::from_table`], or [`Params::from_toml_str`];
/// [`run`](crate::run) validates it again before integrating.
///
/// Mass is in µgC, time in days, temperature in °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    /// Explicit step length (days).
    #[serde(default = "defaults::step_days")]
    pub step_days: f64,

    /// Length of the run after spawning (days).
    pub horizon_days: f64,

    /// Food-saturated development rate at 0 °C (`u0`, 1/day).
    #[serde(default = "defaults::development_rate", alias = "u0")]
    pub development_rate: f64,

    /// Temperature dependence of development (`qd`).
    #[serde(default = "defaults::development_response")]
    pub development_response: TemperatureResponse,

    /// Development at which feeding begins (`Df`).
    #[serde(default = "defaults::first_feeding", alias = "Df")]
    pub first_feeding: f64,

    /// Development at which reserve storage begins (`Ds`).
    #[serde(default = "defaults::storage_onset", alias = "Ds")]
    pub storage_onset: f64,

    /// Maximum ingestion at 0 °C for unit weight (`I0`, 1/day).
    #[serde(default = "defaults::max_ingestion", alias = "I0")]
    pub max_ingestion: f64,

    /// Temperature dependence of ingestion, metabolism, and mortality (`qg`).
    #[serde(default = "defaults::growth_response")]
    pub growth_response: TemperatureResponse,

    /// Functional response of feeding to prey.
    #[serde(default = "defaults::prey_response")]
    pub prey_response: PreyResponse,

    /// Allometric exponent of ingestion (`theta`).
    #[serde(default = "defaults::metabolic_exponent", alias = "theta")]
    pub metabolic_exponent: f64,

    /// Fraction of ingestion assimilated (`r_assim`).
    #[serde(default = "defaults::assimilation_efficiency", alias = "r_assim")]
    pub assimilation_efficiency: f64,

    /// Active metabolism as a fraction of maximum ingestion (`rm`).
    #[serde(default = "defaults::active_metabolism", alias = "rm")]
    pub active_metabolism: f64,

    /// Diapause metabolism relative to active metabolism (`rb`).
    #[serde(default = "defaults::diapause_metabolism", alias = "rb")]
    pub diapause_metabolism: f64,

    /// Cap on reserve as a fraction of total weight.
    #[serde(default = "defaults::max_reserve_fraction")]
    pub max_reserve_fraction: f64,

    /// Nominal gross growth efficiency (`GGE`).
    #[serde(default = "defaults::gross_growth_efficiency", alias = "GGE")]
    pub gross_growth_efficiency: f64,

    /// Temperature at which the theoretical adult weight is evaluated.
    #[serde(default)]
    pub nominal_temperature: f64,

    /// Weight at spawning; defaults to the theoretical egg weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_weight: Option<f64>,

    /// Reserve at spawning as a fraction of weight.
    #[serde(default = "defaults::initial_reserve_fraction")]
    pub initial_reserve_fraction: f64,

    /// Egg weight per unit adult weight (`r_ea`).
    #[serde(default = "defaults::egg_adult_ratio", alias = "r_ea")]
    pub egg_adult_ratio: f64,

    /// Allometric exponent of egg weight on adult weight (`exp_ea`).
    #[serde(default = "defaults::egg_adult_exponent", alias = "exp_ea")]
    pub egg_adult_exponent: f64,

    /// Degree-days of incubation before hatching; 0 hatches at spawn.
    #[serde(default)]
    pub egg_degree_days: f64,

    /// Base temperature of the incubation degree-day sum.
    #[serde(default)]
    pub egg_base_temperature: f64,

    /// Development required to enter diapause (`Ddia`).
    #[serde(default = "defaults::diapause_development", alias = "Ddia")]
    pub diapause_development: f64,

    /// Reserve fraction of weight required to enter diapause.
    #[serde(default)]
    pub diapause_reserve_fraction: f64,

    /// Whether the entry thresholds apply; if not, entry follows the date alone.
    #[serde(default = "defaults::enabled")]
    pub require_diapause_threshold: bool,

    /// Fraction of reserve drawn for eggs that ends up as egg mass.
    #[serde(default = "defaults::egg_conversion_efficiency")]
    pub egg_conversion_efficiency: f64,

    /// Whether reproduction continues for [`spawning_days`](Self::spawning_days).
    #[serde(default)]
    pub multi_clutch: bool,

    /// Length of the spawning season under the multi-clutch policy (days).
    #[serde(default = "defaults::spawning_days")]
    pub spawning_days: f64,

    /// Mortality at 0 °C for unit weight (`m0`, 1/day).
    #[serde(default = "defaults::mortality_rate", alias = "m0")]
    pub mortality_rate: f64,
}

mod defaults {
    use super::{PreyResponse, TemperatureResponse};

    pub(super) fn step_days() -> f64 {
        1.0
    }

    pub(super) fn development_rate() -> f64 {
        0.008
    }

    pub(super) fn development_response() -> TemperatureResponse {
        TemperatureResponse::Q10 { q10: 3.0 }
    }

    pub(super) fn first_feeding() -> f64 {
        0.10
    }

    pub(super) fn storage_onset() -> f64 {
        0.35
    }

    pub(super) fn max_ingestion() -> f64 {
        0.37
    }

    pub(super) fn growth_response() -> TemperatureResponse {
        TemperatureResponse::Q10 { q10: 2.5 }
    }

    pub(super) fn prey_response() -> PreyResponse {
        PreyResponse::Holling2 {
            half_saturation: 1.2,
        }
    }

    pub(super) fn metabolic_exponent() -> f64 {
        0.7
    }

    pub(super) fn assimilation_efficiency() -> f64 {
        0.67
    }

    pub(super) fn active_metabolism() -> f64 {
        0.136
    }

    pub(super) fn diapause_metabolism() -> f64 {
        0.25
    }

    pub(super) fn max_reserve_fraction() -> f64 {
        1.0
    }

    pub(super) fn gross_growth_efficiency() -> f64 {
        0.33
    }

    pub(super) fn initial_reserve_fraction() -> f64 {
        0.1
    }

    pub(super) fn egg_adult_ratio() -> f64 {
        0.013
    }

    pub(super) fn egg_adult_exponent() -> f64 {
        0.62
    }

    pub(super) fn diapause_development() -> f64 {
        0.6
    }

    pub(super) fn enabled() -> bool {
        true
    }

    pub(super) fn egg_conversion_efficiency() -> f64 {
        1.0
    }

    pub(super) fn spawning_days() -> f64 {
        60.0
    }

    pub(super) fn mortality_rate() -> f64 {
        assimilation_efficiency() * gross_growth_efficiency() * max_ingestion()
    }
}

impl Params {
    /// Creates a parameter set with Coltrane defaults and the given horizon.
    #[must_use]
    pub fn new(horizon_days: f64) -> Self {
        Self {
            step_days: defaults::step_days(),
            horizon_days,
            development_rate: defaults::development_rate(),
            development_response: defaults::development_response(),
            first_feeding: defaults::first_feeding(),
            storage_onset: defaults::storage_onset(),
            max_ingestion: defaults::max_ingestion(),
            growth_response: defaults::growth_response(),
            prey_response: defaults::prey_response(),
            metabolic_exponent: defaults::metabolic_exponent(),
            assimilation_efficiency: defaults::assimilation_efficiency(),
            active_metabolism: defaults::active_metabolism(),
            diapause_metabolism: defaults::diapause_metabolism(),
            max_reserve_fraction: defaults::max_reserve_fraction(),
            gross_growth_efficiency: defaults::gross_growth_efficiency(),
            nominal_temperature: 0.0,
            initial_weight: None,
            initial_reserve_fraction: defaults::initial_reserve_fraction(),
            egg_adult_ratio: defaults::egg_adult_ratio(),
            egg_adult_exponent: defaults::egg_adult_exponent(),
            egg_degree_days: 0.0,
            egg_base_temperature: 0.0,
            diapause_development: defaults::diapause_development(),
            diapause_reserve_fraction: 0.0,
            require_diapause_threshold: defaults::enabled(),
            egg_conversion_efficiency: defaults::egg_conversion_efficiency(),
            multi_clutch: false,
            spawning_days: defaults::spawning_days(),
            mortality_rate: defaults::mortality_rate(),
        }
    }

    /// Builds a validated parameter set from a name → value table.
    ///
    /// `horizon_days` is required; every other name falls back to its default.
    /// Flags are true for any non-zero value. The names `q10_development`,
    /// `q10_growth`, and `half_saturation` select the Q10 and Holling type II
    /// forms with the given constant. The short Coltrane names (`u0`, `I0`,
    /// `theta`, and so on) are accepted as aliases.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an unknown name, a missing horizon, or a
    /// value that fails [`Params::validate`].
    pub fn from_table(table: &BTreeMap<String, f64>) -> Result<Self, ConfigError> {
        let horizon_days = table
            .get("horizon_days")
            .copied()
            .ok_or(ConfigError::MissingParameter("horizon_days"))?;

        let mut params = Self::new(horizon_days);
        for (name, &value) in table {
            params.set(name, value)?;
        }
        params.validate()?;
        Ok(params)
    }

    /// Parses and validates a TOML parameter document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown keys, or a
    /// missing `horizon_days`, and any [`Params::validate`] error.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(document)?;
        params.validate()?;
        Ok(params)
    }

    fn set(&mut self, name: &str, value: f64) -> Result<(), ConfigError> {
        let flag = value != 0.0;
        match name {
            "step_days" => self.step_days = value,
            "horizon_days" => self.horizon_days = value,
            "development_rate" | "u0" => self.development_rate = value,
            "q10_development" | "Q10d" => {
                self.development_response = TemperatureResponse::Q10 { q10: value };
            }
            "first_feeding" | "Df" => self.first_feeding = value,
            "storage_onset" | "Ds" => self.storage_onset = value,
            "max_ingestion" | "I0" => self.max_ingestion = value,
            "q10_growth" | "Q10g" => {
                self.growth_response = TemperatureResponse::Q10 { q10: value };
            }
            "half_saturation" | "Ks" => {
                self.prey_response = PreyResponse::Holling2 {
                    half_saturation: value,
                };
            }
            "metabolic_exponent" | "theta" => self.metabolic_exponent = value,
            "assimilation_efficiency" | "r_assim" => self.assimilation_efficiency = value,
            "active_metabolism" | "rm" => self.active_metabolism = value,
            "diapause_metabolism" | "rb" => self.diapause_metabolism = value,
            "max_reserve_fraction" => self.max_reserve_fraction = value,
            "gross_growth_efficiency" | "GGE" => self.gross_growth_efficiency = value,
            "nominal_temperature" => self.nominal_temperature = value,
            "initial_weight" => self.initial_weight = Some(value),
            "initial_reserve_fraction" => self.initial_reserve_fraction = value,
            "egg_adult_ratio" | "r_ea" => self.egg_adult_ratio = value,
            "egg_adult_exponent" | "exp_ea" => self.egg_adult_exponent = value,
            "egg_degree_days" => self.egg_degree_days = value,
            "egg_base_temperature" => self.egg_base_temperature = value,
            "diapause_development" | "Ddia" => self.diapause_development = value,
            "diapause_reserve_fraction" => self.diapause_reserve_fraction = value,
            "require_diapause_threshold" => self.require_diapause_threshold = flag,
            "egg_conversion_efficiency" => self.egg_conversion_efficiency = value,
            "multi_clutch" => self.multi_clutch = flag,
            "spawning_days" => self.spawning_days = value,
            "mortality_rate" | "m0" => self.mortality_rate = value,
            unknown => return Err(ConfigError::UnknownParameter(unknown.to_owned())),
        }
        Ok(())
    }

    /// Checks every value for finiteness and range.
    ///
    /// # Errors
    ///
    /// Returns the first offending parameter as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |value: f64| (0.0..=1.0).contains(&value);

        check("step_days", self.step_days, self.step_days > 0.0, "> 0")?;
        check(
            "horizon_days",
            self.horizon_days,
            self.horizon_days >= self.step_days,
            ">= step_days",
        )?;
        #[allow(clippy::cast_precision_loss)]
        let max_steps = MAX_STEPS as f64;
        check(
            "horizon_days",
            self.horizon_days,
            self.horizon_days / self.step_days <= max_steps,
            "at most 10_000_000 steps of step_days",
        )?;
        check(
            "development_rate",
            self.development_rate,
            self.development_rate > 0.0,
            "> 0",
        )?;
        self.development_response.validate("development_response")?;
        check("first_feeding", self.first_feeding, unit(self.first_feeding), "in [0, 1]")?;
        check(
            "storage_onset",
            self.storage_onset,
            (0.0..1.0).contains(&self.storage_onset),
            "in [0, 1)",
        )?;
        check("max_ingestion", self.max_ingestion, self.max_ingestion > 0.0, "> 0")?;
        self.growth_response.validate("growth_response")?;
        self.prey_response.validate("prey_response")?;
        check(
            "metabolic_exponent",
            self.metabolic_exponent,
            self.metabolic_exponent > 0.0 && self.metabolic_exponent < 1.0,
            "in (0, 1)",
        )?;
        check(
            "assimilation_efficiency",
            self.assimilation_efficiency,
            unit(self.assimilation_efficiency),
            "in [0, 1]",
        )?;
        check(
            "active_metabolism",
            self.active_metabolism,
            self.active_metabolism >= 0.0,
            ">= 0",
        )?;
        check(
            "diapause_metabolism",
            self.diapause_metabolism,
            unit(self.diapause_metabolism),
            "in [0, 1]",
        )?;
        check(
            "max_reserve_fraction",
            self.max_reserve_fraction,
            self.max_reserve_fraction > 0.0 && self.max_reserve_fraction <= 1.0,
            "in (0, 1]",
        )?;
        check(
            "gross_growth_efficiency",
            self.gross_growth_efficiency,
            self.gross_growth_efficiency > 0.0 && self.gross_growth_efficiency <= 1.0,
            "in (0, 1]",
        )?;
        check("nominal_temperature", self.nominal_temperature, true, "finite")?;
        if let Some(weight) = self.initial_weight {
            check("initial_weight", weight, weight > 0.0, "> 0")?;
        }
        check(
            "initial_reserve_fraction",
            self.initial_reserve_fraction,
            self.initial_reserve_fraction >= 0.0
                && self.initial_reserve_fraction <= self.max_reserve_fraction,
            "in [0, max_reserve_fraction]",
        )?;
        check("egg_adult_ratio", self.egg_adult_ratio, self.egg_adult_ratio > 0.0, "> 0")?;
        check(
            "egg_adult_exponent",
            self.egg_adult_exponent,
            self.egg_adult_exponent >= 0.0,
            ">= 0",
        )?;
        check("egg_degree_days", self.egg_degree_days, self.egg_degree_days >= 0.0, ">= 0")?;
        check("egg_base_temperature", self.egg_base_temperature, true, "finite")?;
        check(
            "diapause_development",
            self.diapause_development,
            unit(self.diapause_development),
            "in [0, 1]",
        )?;
        check(
            "diapause_reserve_fraction",
            self.diapause_reserve_fraction,
            unit(self.diapause_reserve_fraction),
            "in [0, 1]",
        )?;
        check(
            "egg_conversion_efficiency",
            self.egg_conversion_efficiency,
            self.egg_conversion_efficiency > 0.0 && self.egg_conversion_efficiency <= 1.0,
            "in (0, 1]",
        )?;
        check("spawning_days", self.spawning_days, self.spawning_days > 0.0, "> 0")?;
        check("mortality_rate", self.mortality_rate, self.mortality_rate >= 0.0, ">= 0")?;

        let egg_weight = self.egg_weight();
        check(
            "initial_weight",
            egg_weight,
            egg_weight > 0.0,
            "a positive egg weight at nominal_temperature",
        )
    }

    /// Number of explicit steps needed to cover the horizon, at most
    /// [`MAX_STEPS`].
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn step_count(&self) -> usize {
        (self.horizon_days / self.step_days - 1e-9)
            .ceil()
            .max(1.0)
            .min(MAX_STEPS as f64) as usize
    }

    /// Adult weight implied by the growth and development constants (`Wa`).
    ///
    /// This is the weight at maturity of an animal that feeds at nominal
    /// efficiency at [`nominal_temperature`](Self::nominal_temperature) from
    /// first feeding onward.
    #[must_use]
    pub fn theoretical_adult_weight(&self) -> f64 {
        let t = self.nominal_temperature;
        let qg = self.growth_response.factor(t);
        let qd = self.development_response.factor(t);
        let theta = self.metabolic_exponent;

        let scale = (1.0 - theta)
            * self.gross_growth_efficiency
            * (1.0 - self.first_feeding)
            * (qg / qd)
            * (self.max_ingestion / self.development_rate);
        scale.powf(1.0 / (1.0 - theta))
    }

    /// Egg weight (`We`): the initial weight if set, otherwise `r_ea · Wa^exp_ea`.
    #[must_use]
    pub fn egg_weight(&self) -> f64 {
        self.initial_weight.unwrap_or_else(|| {
            self.egg_adult_ratio * self.theoretical_adult_weight().powf(self.egg_adult_exponent)
        })
    }

    /// Whether a cohort spends time in the egg stage before hatching.
    #[must_use]
    pub fn incubates(&self) -> bool {
        self.egg_degree_days > 0.0
    }
}
