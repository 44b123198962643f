//! Scoring engine for award-season odds: candidate model, propensity scoring,
//! calibration, category rebalancing and source-signal merging.

pub mod calibrate;
mod error;
pub mod experience;
pub mod model;
pub mod odds;
pub mod rebalance;
pub mod scorer;
pub mod signals;
pub mod title;

pub use calibrate::{NominationCurve, WinnerCurve, nomination_odds, winner_odds};
pub use error::CoreError;
pub use experience::{CategoryExperience, ExperienceConfig, TrackRecord};
pub use model::{
    Candidate, Category, FEATURE_MAX, FEATURE_MIN, NormalizedWeights, Season, Strength,
    clamp_feature, is_individual_category,
};
pub use odds::{
    CandidateOdds, CategoryOdds, OddsConfig, calibrate_category, evaluate_category, score_category,
};
pub use rebalance::{
    OddsFields, RebalanceBand, RebalanceConfig, RebalanceOutcome, rebalance_category,
    rebalance_field_total,
};
pub use scorer::{Contributions, ScoreResult, score};
pub use signals::{SignalUpdate, SourceSnapshot, apply_snapshot, apply_source_signals};
pub use title::normalize_title;
