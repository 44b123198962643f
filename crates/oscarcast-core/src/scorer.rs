//! Per-candidate propensity scoring.
//!
//! A weighted composite of the three features is centred on the population
//! average, squashed through a logistic, then scaled by campaign strength.
//! The win propensity further leans on precursor support and, for
//! individual categories, on the contender's track record.

use serde::{Deserialize, Serialize};

use crate::experience::{self, ExperienceConfig};
use crate::{Candidate, NormalizedWeights};

/// Assumed population-average composite score.
pub const POPULATION_MEAN: f64 = 55.0;
/// Assumed composite spread; typical composites land within about ±2 units.
pub const POPULATION_SPREAD: f64 = 12.0;
/// Win propensity factor is `WIN_PRECURSOR_BASE + precursor / WIN_PRECURSOR_DIVISOR`.
pub const WIN_PRECURSOR_BASE: f64 = 0.6;
pub const WIN_PRECURSOR_DIVISOR: f64 = 190.0;

/// Weighted feature contributions to the linear composite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributions {
    pub precursor: f64,
    pub history: f64,
    pub buzz: f64,
}

impl Contributions {
    pub fn total(&self) -> f64 {
        self.precursor + self.history + self.buzz
    }
}

/// Unnormalised propensities for one candidate, plus what went into them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub nomination_raw: f64,
    pub winner_raw: f64,
    pub contributions: Contributions,
    pub strength_multiplier: f64,
    pub experience_multiplier: f64,
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Score one candidate.
///
/// `experience` only affects individual categories; pass `None` for a plain
/// feature-driven score (the backtest does). `None` and an empty config are
/// not the same: with a config, a contender absent from its tables counts
/// as a first-timer and gets [`FIRST_TIMER_BONUS`](experience::FIRST_TIMER_BONUS).
pub fn score(
    category_id: &str,
    candidate: &Candidate,
    weights: &NormalizedWeights,
    experience: Option<&ExperienceConfig>,
) -> ScoreResult {
    let (precursor, history, buzz) = candidate.features();
    let contributions = Contributions {
        precursor: precursor * weights.precursor,
        history: history * weights.history,
        buzz: buzz * weights.buzz,
    };
    let centered = (contributions.total() - POPULATION_MEAN) / POPULATION_SPREAD;

    let strength_multiplier = candidate.strength.multiplier();
    let experience_multiplier = experience::multiplier_for(category_id, candidate, experience);

    let nomination_raw = sigmoid(centered) * strength_multiplier;
    let winner_raw = nomination_raw
        * (WIN_PRECURSOR_BASE + precursor / WIN_PRECURSOR_DIVISOR)
        * experience_multiplier;

    ScoreResult {
        nomination_raw,
        winner_raw,
        contributions,
        strength_multiplier,
        experience_multiplier,
    }
}
