use std::fmt;

use serde::{Deserialize, Serialize};

/// Start of each stage in Bělehrádek development time at 0 °C.
///
/// Campbell et al. (2001), *Calanus finmarchicus*, rescaled so that the
/// adult moult sits at development 1.
const STAGE_STARTS: [f64; 13] = [
    0.0, 595.0, 983.0, 1564.0, 2951.0, 3710.0, 4426.0, 5267.0, 6233.0, 7370.0, 8798.0, 10964.0,
    15047.0,
];

/// Developmental stage of a cohort: egg, six naupliar, and six copepodite stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    E,
    N1,
    N2,
    N3,
    N4,
    N5,
    N6,
    C1,
    C2,
    C3,
    C4,
    C5,
    C6,
}

impl Stage {
    /// All stages in developmental order.
    pub const ALL: [Stage; 13] = [
        Stage::E,
        Stage::N1,
        Stage::N2,
        Stage::N3,
        Stage::N4,
        Stage::N5,
        Stage::N6,
        Stage::C1,
        Stage::C2,
        Stage::C3,
        Stage::C4,
        Stage::C5,
        Stage::C6,
    ];

    /// Returns the stage reached at development `development`.
    ///
    /// Values below 0 map to the egg and values at or above 1 to the adult.
    #[must_use]
    pub fn from_development(development: f64) -> Self {
        let scale = STAGE_STARTS[STAGE_STARTS.len() - 1];
        let index = STAGE_STARTS
            .iter()
            .rposition(|&start| development >= start / scale)
            .unwrap_or(0);
        Self::ALL[index]
    }

    /// Development at which this stage begins.
    #[must_use]
    pub fn onset(self) -> f64 {
        STAGE_STARTS[self as usize] / STAGE_STARTS[STAGE_STARTS.len() - 1]
    }

    /// Development halfway through this stage. The adult stage has no end and
    /// returns its onset.
    #[must_use]
    pub fn midpoint(self) -> f64 {
        match Self::ALL.get(self as usize + 1) {
            Some(next) => 0.5 * (self.onset() + next.onset()),
            None => self.onset(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
