//! Candidates, categories and session weights.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Categories that honour a person rather than a film. Only these carry a
/// track-record (experience) adjustment.
pub const INDIVIDUAL_CATEGORIES: &[&str] = &[
    "best-director",
    "best-actor",
    "best-actress",
    "best-supporting-actor",
    "best-supporting-actress",
];

/// Whether `category_id` honours an individual contender.
pub fn is_individual_category(category_id: &str) -> bool {
    INDIVIDUAL_CATEGORIES.contains(&category_id)
}

/// Campaign-strength tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strength {
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[default]
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

impl Strength {
    /// Fixed propensity multiplier for this tier.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::High => 1.06,
            Self::Medium => 1.00,
            Self::Low => 0.94,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Lowest feature value.
pub const FEATURE_MIN: i32 = 0;
/// Highest feature value.
pub const FEATURE_MAX: i32 = 100;

/// Hold a feature to `[FEATURE_MIN, FEATURE_MAX]`.
pub fn clamp_feature(value: i32) -> i32 {
    value.clamp(FEATURE_MIN, FEATURE_MAX)
}

/// One contender in one category.
///
/// For person categories `studio` holds the associated film title, which is
/// what lets a performer pick up signal keyed by their film.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    #[serde(default)]
    pub studio: String,
    #[serde(default)]
    pub precursor: i32,
    #[serde(default)]
    pub history: i32,
    #[serde(default)]
    pub buzz: i32,
    #[serde(default)]
    pub strength: Strength,
    /// Ground truth, only present in historical fixtures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<bool>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, studio: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            studio: studio.into(),
            precursor: 0,
            history: 0,
            buzz: 0,
            strength: Strength::Medium,
            nominated: None,
            winner: None,
        }
    }

    /// Builder-style feature setter.
    pub fn with_features(mut self, precursor: i32, history: i32, buzz: i32) -> Self {
        self.precursor = precursor;
        self.history = history;
        self.buzz = buzz;
        self
    }

    /// `(precursor, history, buzz)` clamped into the feature range.
    ///
    /// Season files are taken as given, so scoring reads features through
    /// this rather than the raw fields.
    pub fn features(&self) -> (f64, f64, f64) {
        (
            clamp_feature(self.precursor) as f64,
            clamp_feature(self.history) as f64,
            clamp_feature(self.buzz) as f64,
        )
    }

    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }
}

/// A named award category with its ordered candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Nominee slots.
    pub nominees: usize,
    /// Baseline unconditional win rate.
    pub winner_base: f64,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl Category {
    pub fn is_individual(&self) -> bool {
        is_individual_category(&self.id)
    }

    /// `nominees / candidate_count`, or 1.0 for an empty category.
    pub fn nominee_scale(&self) -> f64 {
        if self.candidates.is_empty() {
            return 1.0;
        }
        self.nominees as f64 / self.candidates.len() as f64
    }
}

/// A season slate: every category shown in one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Season {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Season {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Feature weights normalised to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedWeights {
    pub precursor: f64,
    pub history: f64,
    pub buzz: f64,
}

impl NormalizedWeights {
    /// Normalise raw integer session weights by simple division.
    pub fn from_raw(precursor: u32, history: u32, buzz: u32) -> Result<Self, CoreError> {
        let total = precursor as f64 + history as f64 + buzz as f64;
        if total <= 0.0 {
            return Err(CoreError::ZeroWeights {
                precursor,
                history,
                buzz,
            });
        }
        Ok(Self {
            precursor: precursor as f64 / total,
            history: history as f64 / total,
            buzz: buzz as f64 / total,
        })
    }
}

impl Default for NormalizedWeights {
    fn default() -> Self {
        Self {
            precursor: 0.58,
            history: 0.30,
            buzz: 0.12,
        }
    }
}
