//! Built-in seasonal forcing cycles.

use ndarray::{Array1, s};

use crate::{ForcingError, ForcingSeries};

/// Days in one sampled cycle.
const CYCLE_DAYS: usize = 365;

/// Surface temperature on 1 January (°C).
const T_JAN1: f64 = -0.7;
/// Winter minimum surface temperature (°C), reached at [`T_MIN_DAY`].
const T_MIN: f64 = -1.8;
/// Summer maximum surface temperature (°C), reached at [`T_MAX_DAY`].
const T_MAX: f64 = 3.7;
const T_MIN_DAY: usize = 105;
const T_MAX_DAY: usize = 250;
/// Year-round temperature at diapause depth (°C).
const T_DEEP: f64 = 1.0;

/// Winter prey floor.
const P_WINTER: f64 = 0.1;
/// Spring bloom peak, centre, and e-folding half-width (days).
const P_SPRING: (f64, f64, f64) = (13.0, 150.0, 15.0);
/// Autumn bloom peak, centre, and e-folding half-width (days).
const P_AUTUMN: (f64, f64, f64) = (5.0, 225.0, 30.0);
/// Prey floor between the blooms, as a fraction of the spring peak.
const SUMMER_FRACTION: f64 = 0.05;

/// The Disko Bay (West Greenland) seasonal cycle, repeated for `years` years.
///
/// One daily cycle following the 1996–1997 observations of Madsen et al.
/// (2001): surface temperature falls linearly from -0.7 °C on 1 January to a
/// -1.8 °C minimum on yearday 105, warms to 3.7 °C by yearday 250, and cools
/// back to its January value. Deep water is 1 °C year-round. Prey is a 0.1
/// winter floor under a spring bloom (peak 13 on yearday 150) and an autumn
/// bloom (peak 5 on yearday 225), with a summer floor of 0.65 between them.
///
/// # Errors
///
/// Returns [`ForcingError::EmptyCycle`] if `years` is zero.
pub fn disko_bay(years: usize) -> Result<ForcingSeries, ForcingError> {
    let temperature = disko_bay_temperature();
    let deep = vec![T_DEEP; CYCLE_DAYS];
    let food = disko_bay_prey();

    ForcingSeries::from_annual_cycle(&temperature, Some(&deep), &food, years)
}

fn disko_bay_temperature() -> Vec<f64> {
    let mut t = Array1::<f64>::zeros(CYCLE_DAYS);

    // Yeardays are 1-based, so yearday `d` is index `d - 1`.
    t.slice_mut(s![..T_MIN_DAY])
        .assign(&Array1::linspace(T_JAN1, T_MIN, T_MIN_DAY));
    t.slice_mut(s![T_MIN_DAY - 1..T_MAX_DAY])
        .assign(&Array1::linspace(T_MIN, T_MAX, T_MAX_DAY - T_MIN_DAY + 1));
    t.slice_mut(s![T_MAX_DAY - 1..])
        .assign(&Array1::linspace(T_MAX, T_JAN1, CYCLE_DAYS - T_MAX_DAY + 1));

    t.to_vec()
}

fn disko_bay_prey() -> Vec<f64> {
    let bloom = |yearday: f64, (peak, centre, width): (f64, f64, f64)| {
        peak * (-((yearday - centre) / width).powi(2)).exp()
    };

    (1..=CYCLE_DAYS)
        .map(|yearday| {
            #[allow(clippy::cast_precision_loss)]
            let yearday = yearday as f64;
            let mut prey = P_WINTER
                .max(bloom(yearday, P_SPRING))
                .max(bloom(yearday, P_AUTUMN));
            if yearday > P_SPRING.1 && yearday < P_AUTUMN.1 {
                prey = prey.max(SUMMER_FRACTION * P_SPRING.0);
            }
            prey
        })
        .collect()
}
