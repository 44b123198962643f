//! Category-level odds: score every candidate, calibrate against the
//! category totals, then rebalance.

use serde::{Deserialize, Serialize};

use crate::calibrate::{NominationCurve, WinnerCurve};
use crate::experience::ExperienceConfig;
use crate::rebalance::{OddsFields, RebalanceConfig, rebalance_category};
use crate::scorer::{Contributions, ScoreResult, score};
use crate::{Category, CoreError, NormalizedWeights, Strength};

/// Every tunable used to turn propensities into displayed odds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsConfig {
    pub nomination_curve: NominationCurve,
    pub winner_curve: WinnerCurve,
    pub rebalance: RebalanceConfig,
}

impl OddsConfig {
    /// Parse a partial JSON config; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Calibrated odds for one candidate, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateOdds {
    pub title: String,
    pub studio: String,
    pub strength: Strength,
    pub nomination_raw: f64,
    pub winner_raw: f64,
    pub contributions: Contributions,
    pub nomination: f64,
    pub winner: f64,
}

impl OddsFields for CandidateOdds {
    fn nomination_mut(&mut self) -> &mut f64 {
        &mut self.nomination
    }

    fn winner_mut(&mut self) -> &mut f64 {
        &mut self.winner
    }
}

/// Odds for a whole category, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOdds {
    pub category_id: String,
    pub name: String,
    pub candidates: Vec<CandidateOdds>,
}

/// Score every candidate in display order.
pub fn score_category(
    category: &Category,
    weights: &NormalizedWeights,
    experience: Option<&ExperienceConfig>,
) -> Vec<ScoreResult> {
    category
        .candidates
        .iter()
        .map(|c| score(&category.id, c, weights, experience))
        .collect()
}

/// Calibrate precomputed scores against the category totals.
///
/// `scores` pairs with `category.candidates` by position; extra entries on
/// either side are ignored.
pub fn calibrate_category(
    category: &Category,
    scores: &[ScoreResult],
    config: &OddsConfig,
) -> Vec<CandidateOdds> {
    let nomination_total: f64 = scores.iter().map(|s| s.nomination_raw).sum();
    let winner_total: f64 = scores.iter().map(|s| s.winner_raw).sum();
    let nominee_scale = category.nominee_scale();

    category
        .candidates
        .iter()
        .zip(scores)
        .map(|(candidate, s)| {
            let nomination =
                config
                    .nomination_curve
                    .odds(s.nomination_raw, nomination_total, nominee_scale);
            let winner = config.winner_curve.odds(
                s.winner_raw,
                winner_total,
                nomination,
                category.winner_base,
            );
            CandidateOdds {
                title: candidate.title.clone(),
                studio: candidate.studio.clone(),
                strength: candidate.strength,
                nomination_raw: s.nomination_raw,
                winner_raw: s.winner_raw,
                contributions: s.contributions,
                nomination,
                winner,
            }
        })
        .collect()
}

/// Calibrate and rebalance a category from precomputed scores.
pub fn evaluate_category(
    category: &Category,
    scores: &[ScoreResult],
    config: &OddsConfig,
) -> CategoryOdds {
    let mut candidates = calibrate_category(category, scores, config);
    rebalance_category(&mut candidates, &config.rebalance);
    CategoryOdds {
        category_id: category.id.clone(),
        name: category.name.clone(),
        candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candidate;

    fn actress_race() -> Category {
        Category {
            id: "best-actress".into(),
            name: "Best Actress".into(),
            nominees: 5,
            winner_base: 0.5,
            candidates: vec![
                Candidate::new("Emma Stone", "Poor Things")
                    .with_features(88, 70, 80)
                    .with_strength(Strength::High),
                Candidate::new("Lily Gladstone", "Killers of the Flower Moon")
                    .with_features(86, 40, 75)
                    .with_strength(Strength::High),
                Candidate::new("Sandra Hüller", "Anatomy of a Fall").with_features(70, 45, 60),
                Candidate::new("Carey Mulligan", "Maestro").with_features(62, 60, 40),
                Candidate::new("Annette Bening", "Nyad").with_features(58, 75, 30),
                Candidate::new("Margot Robbie", "Barbie").with_features(55, 50, 85),
                Candidate::new("Greta Lee", "Past Lives")
                    .with_features(45, 20, 55)
                    .with_strength(Strength::Low),
            ],
        }
    }

    #[test]
    fn calibrated_odds_follow_scores() {
        let cat = actress_race();
        let scores = score_category(&cat, &NormalizedWeights::default(), None);
        let odds = calibrate_category(&cat, &scores, &OddsConfig::default());
        assert_eq!(odds.len(), 7);
        assert!(odds[0].nomination > odds[6].nomination);
        assert!(odds[0].winner > odds[6].winner);
        assert_eq!(odds[1].studio, "Killers of the Flower Moon");
    }

    #[test]
    fn evaluated_category_within_bands() {
        let cat = actress_race();
        let scores = score_category(&cat, &NormalizedWeights::default(), None);
        let config = OddsConfig::default();
        let out = evaluate_category(&cat, &scores, &config);

        let nom: f64 = out.candidates.iter().map(|c| c.nomination).sum();
        assert!((90.0..=95.0).contains(&nom), "nomination total {nom}");
        for c in &out.candidates {
            assert!(c.winner <= c.nomination * 0.5 + 1e-12, "{} breaks the cap", c.title);
            assert!((0.6..=50.0).contains(&c.nomination));
        }
        assert_eq!(out.category_id, "best-actress");
    }

    #[test]
    fn empty_category_is_fine() {
        let cat = Category {
            id: "best-picture".into(),
            name: "Best Picture".into(),
            nominees: 10,
            winner_base: 0.35,
            candidates: vec![],
        };
        let out = evaluate_category(&cat, &[], &OddsConfig::default());
        assert!(out.candidates.is_empty());
    }

    #[test]
    fn partial_config_json_keeps_defaults() {
        let cfg = OddsConfig::from_json(r#"{"rebalance": {"winner_to_nomination_cap": 0.4}}"#)
            .unwrap();
        assert_eq!(cfg.rebalance.winner_to_nomination_cap, 0.4);
        assert_eq!(cfg.rebalance.nomination, crate::RebalanceBand::nomination());
        assert_eq!(cfg.nomination_curve, NominationCurve::default());
    }

    #[test]
    fn config_rejects_garbage() {
        assert!(OddsConfig::from_json("not json").is_err());
    }
}
