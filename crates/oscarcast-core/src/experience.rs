//! Track-record adjustments for individual contenders.
//!
//! Prior wins, recent-winner penalties and overdue narratives are supplied
//! per session as an [`ExperienceConfig`] value and passed into the scorer,
//! so scoring stays a pure function of its arguments.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::is_individual_category;
use crate::title::normalize_title;
use crate::Candidate;

pub const FIRST_TIMER_BONUS: f64 = 0.06;
pub const REPEAT_WINNER_BASE_PENALTY: f64 = 0.08;
pub const REPEAT_WINNER_STEP_PENALTY: f64 = 0.03;
/// Prior wins beyond this count add no further penalty.
pub const REPEAT_WINNER_CAP: u32 = 3;
pub const RECENT_WINNER_PENALTY: f64 = 0.12;
pub const OVERDUE_BONUS: f64 = 0.08;
pub const MIN_EXPERIENCE: f64 = 0.55;
pub const MAX_EXPERIENCE: f64 = 1.15;

/// Per-session experience tables, keyed by category id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceConfig {
    #[serde(default)]
    pub categories: HashMap<String, CategoryExperience>,
}

/// Experience tables for one category, keyed by contender name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryExperience {
    /// Prior wins in this category.
    #[serde(default)]
    pub prior_wins: HashMap<String, u32>,
    /// Penalty level for contenders who won very recently.
    #[serde(default)]
    pub recent_winners: HashMap<String, f64>,
    /// Contenders carrying an "overdue" narrative.
    #[serde(default)]
    pub overdue: Vec<String>,
}

/// Resolved track record for one contender.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackRecord {
    pub prior_wins: u32,
    pub recent_winner_level: f64,
    pub overdue: bool,
}

impl ExperienceConfig {
    /// Look up a contender's record. Names match after title normalisation,
    /// so "Renée Zellweger" and "renée  zellweger" resolve to the same entry.
    pub fn track_record(&self, category_id: &str, name: &str) -> TrackRecord {
        let Some(tables) = self.categories.get(category_id) else {
            return TrackRecord::default();
        };
        let key = normalize_title(name);
        let matches = |k: &String| normalize_title(k) == key;

        TrackRecord {
            prior_wins: tables
                .prior_wins
                .iter()
                .find(|(k, _)| matches(k))
                .map(|(_, v)| *v)
                .unwrap_or(0),
            recent_winner_level: tables
                .recent_winners
                .iter()
                .find(|(k, _)| matches(k))
                .map(|(_, v)| if v.is_finite() { *v } else { 0.0 })
                .unwrap_or(0.0),
            overdue: tables.overdue.iter().any(matches),
        }
    }
}

/// Multiplier applied to a contender's win propensity from its track record.
pub fn experience_multiplier(record: &TrackRecord) -> f64 {
    let mut m = 1.0;
    if record.prior_wins == 0 {
        m += FIRST_TIMER_BONUS;
    } else {
        m -= REPEAT_WINNER_BASE_PENALTY
            + REPEAT_WINNER_STEP_PENALTY * record.prior_wins.min(REPEAT_WINNER_CAP) as f64;
    }
    m -= RECENT_WINNER_PENALTY * record.recent_winner_level;
    if record.overdue {
        m += OVERDUE_BONUS;
    }
    m.clamp(MIN_EXPERIENCE, MAX_EXPERIENCE)
}

/// Experience multiplier for `candidate` in `category_id`.
///
/// Film categories and sessions without a config always get 1.0. Once a
/// config is supplied every individual contender is rated, so one missing
/// from the tables (or an empty config) gets the first-timer bonus.
pub fn multiplier_for(
    category_id: &str,
    candidate: &Candidate,
    experience: Option<&ExperienceConfig>,
) -> f64 {
    match experience {
        Some(config) if is_individual_category(category_id) => {
            experience_multiplier(&config.track_record(category_id, &candidate.title))
        }
        _ => 1.0,
    }
}
