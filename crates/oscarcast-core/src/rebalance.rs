//! Category rebalancing.
//!
//! Calibrated percentages are computed per candidate, so nothing ties their
//! sum to a realistic total. Rebalancing scales a category's values towards
//! a target total, clamps each value into per-candidate bounds, then spends
//! at most [`CORRECTION_PASSES`] passes redistributing whatever the clamping
//! absorbed across the entries that still have slack.
//!
//! The correction is best-effort. With degenerate bands (a handful of
//! entries, most of them pinned at a bound) the sum can stay outside
//! `[min_total, max_total]`; use [`RebalanceBand::is_feasible`] first when a
//! hard guarantee is needed.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calibrate::{clamp, finite_or_zero};

/// Number of correction passes after the initial scaling.
pub const CORRECTION_PASSES: usize = 2;

/// Allowed totals across a category and bounds for each entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebalanceBand {
    pub min_total: f64,
    pub max_total: f64,
    pub target_total: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl RebalanceBand {
    /// Nomination odds: total 90–95 (target 93), each 0.6–50.
    pub fn nomination() -> Self {
        Self {
            min_total: 90.0,
            max_total: 95.0,
            target_total: 93.0,
            min_value: 0.6,
            max_value: 50.0,
        }
    }

    /// Win odds: total 30–45 (target 38), each 0.4–24.
    pub fn winner() -> Self {
        Self {
            min_total: 30.0,
            max_total: 45.0,
            target_total: 38.0,
            min_value: 0.4,
            max_value: 24.0,
        }
    }

    /// Whether `n` entries can land inside the total band at all.
    pub fn is_feasible(&self, n: usize) -> bool {
        let n = n as f64;
        self.min_total <= self.max_total
            && self.min_value <= self.max_value
            && self.min_value * n <= self.max_total
            && self.max_value * n >= self.min_total
    }

    fn clamped_target(&self) -> f64 {
        clamp(self.target_total, self.min_total, self.max_total)
    }

    fn contains_total(&self, total: f64) -> bool {
        total >= self.min_total && total <= self.max_total
    }
}

/// Bands and the cross-field cap for a whole category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceConfig {
    pub nomination: RebalanceBand,
    pub winner: RebalanceBand,
    /// A win percentage never exceeds this fraction of the nomination percentage.
    pub winner_to_nomination_cap: f64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            nomination: RebalanceBand::nomination(),
            winner: RebalanceBand::winner(),
            winner_to_nomination_cap: 0.5,
        }
    }
}

/// What a single [`rebalance_field_total`] call ended with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalanceOutcome {
    pub total: f64,
    pub in_band: bool,
    /// Correction passes that actually moved values.
    pub passes: usize,
}

/// An entry carrying both rebalanced percentages.
pub trait OddsFields {
    fn nomination_mut(&mut self) -> &mut f64;
    fn winner_mut(&mut self) -> &mut f64;
}

fn field_total<T, F>(entries: &mut [T], field: &F) -> f64
where
    F: Fn(&mut T) -> &mut f64,
{
    entries.iter_mut().map(|e| *field(e)).sum()
}

/// Force the sum of one numeric field across `entries` into `band`.
///
/// Mutates in place. Empty input is left untouched.
pub fn rebalance_field_total<T, F>(
    entries: &mut [T],
    field: F,
    band: &RebalanceBand,
) -> RebalanceOutcome
where
    F: Fn(&mut T) -> &mut f64,
{
    if entries.is_empty() {
        return RebalanceOutcome {
            total: 0.0,
            in_band: band.contains_total(0.0),
            passes: 0,
        };
    }

    let n = entries.len();
    let target = band.clamped_target();

    for e in entries.iter_mut() {
        let v = field(e);
        *v = finite_or_zero(*v);
    }

    let mut total = field_total(entries, &field);
    if total <= 0.0 {
        let even = clamp(target / n as f64, band.min_value, band.max_value);
        for e in entries.iter_mut() {
            *field(e) = even;
        }
        total = field_total(entries, &field);
    }

    let factor = target / total;
    for e in entries.iter_mut() {
        let v = field(e);
        *v = clamp(*v * factor, band.min_value, band.max_value);
    }

    let mut passes = 0;
    for _ in 0..CORRECTION_PASSES {
        let total = field_total(entries, &field);
        if band.contains_total(total) {
            break;
        }
        let goal = if total < band.min_total {
            band.min_total
        } else {
            band.max_total
        };
        let delta = goal - total;

        let slack: Vec<usize> = entries
            .iter_mut()
            .enumerate()
            .filter_map(|(i, e)| {
                let v = *field(e);
                let has_room = if delta > 0.0 {
                    v < band.max_value
                } else {
                    v > band.min_value
                };
                has_room.then_some(i)
            })
            .collect();
        if slack.is_empty() {
            break;
        }

        let share = delta / slack.len() as f64;
        for i in slack {
            let v = field(&mut entries[i]);
            *v = clamp(*v + share, band.min_value, band.max_value);
        }
        passes += 1;
    }

    let total = field_total(entries, &field);
    let in_band = band.contains_total(total);
    if !in_band {
        warn!(
            total,
            min_total = band.min_total,
            max_total = band.max_total,
            entries = n,
            "rebalance left total outside band"
        );
    }
    RebalanceOutcome {
        total,
        in_band,
        passes,
    }
}

/// Rebalance nomination then win odds, then cap each win percentage at
/// `winner_to_nomination_cap` times its nomination percentage.
pub fn rebalance_category<T: OddsFields>(entries: &mut [T], config: &RebalanceConfig) {
    rebalance_field_total(entries, |e: &mut T| e.nomination_mut(), &config.nomination);
    rebalance_field_total(entries, |e: &mut T| e.winner_mut(), &config.winner);

    let cap = finite_or_zero(config.winner_to_nomination_cap);
    for e in entries.iter_mut() {
        let ceiling = *e.nomination_mut() * cap;
        let w = e.winner_mut();
        *w = w.min(ceiling);
    }
}
