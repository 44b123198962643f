//! Propensity → percentage calibration.
//!
//! Both curves are fail-soft: non-finite inputs are treated as zero and the
//! result is always clamped into the curve's `[min, max]`.

use serde::{Deserialize, Serialize};

/// Calibration curve for nomination odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NominationCurve {
    pub uplift: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for NominationCurve {
    fn default() -> Self {
        Self {
            uplift: 1.14,
            min: 0.6,
            max: 99.0,
        }
    }
}

/// Calibration curve for win odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WinnerCurve {
    pub uplift: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for WinnerCurve {
    fn default() -> Self {
        Self {
            uplift: 1.2,
            min: 0.4,
            max: 92.0,
        }
    }
}

/// Coerce NaN and infinities to zero.
pub(crate) fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

/// Clamp without panicking on an inverted range; `min` wins.
pub(crate) fn clamp(x: f64, min: f64, max: f64) -> f64 {
    x.min(max).max(min)
}

/// Candidate's share of the category total, as a percentage.
fn share_pct(raw: f64, category_raw_total: f64) -> f64 {
    finite_or_zero(raw) / finite_or_zero(category_raw_total).max(1.0) * 100.0
}

impl NominationCurve {
    pub fn odds(&self, raw: f64, category_raw_total: f64, nominee_scale: f64) -> f64 {
        let pct = share_pct(raw, category_raw_total)
            * finite_or_zero(nominee_scale)
            * finite_or_zero(self.uplift);
        clamp(pct, self.min, self.max)
    }
}

impl WinnerCurve {
    /// Win odds conditioned on the already-calibrated nomination odds.
    ///
    /// `winner_base` weights the nomination odds against the raw share, so
    /// categories with historically concentrated winners track nomination
    /// strength more closely.
    pub fn odds(
        &self,
        raw: f64,
        category_raw_total: f64,
        nomination_odds: f64,
        winner_base: f64,
    ) -> f64 {
        let base = finite_or_zero(winner_base);
        let blended = (share_pct(raw, category_raw_total) + finite_or_zero(nomination_odds) * base)
            / (1.0 + base);
        clamp(finite_or_zero(blended * self.uplift), self.min, self.max)
    }
}

/// Nomination odds with the default curve (uplift 1.14, range 0.6–99).
pub fn nomination_odds(raw: f64, category_raw_total: f64, nominee_scale: f64) -> f64 {
    NominationCurve::default().odds(raw, category_raw_total, nominee_scale)
}

/// Win odds with the default curve (uplift 1.2, range 0.4–92).
pub fn winner_odds(
    raw: f64,
    category_raw_total: f64,
    nomination_odds: f64,
    winner_base: f64,
) -> f64 {
    WinnerCurve::default().odds(raw, category_raw_total, nomination_odds, winner_base)
}
