//! Replay the scorer and calibrator over labelled ceremonies.
//!
//! Each (year, category) race becomes one [`BacktestRow`]. Odds come from
//! the same calibration curves the live pipeline uses, without rebalancing
//! and without track-record adjustments, so the numbers reflect the feature
//! weights alone.

use std::collections::BTreeMap;

use oscarcast_core::{
    CandidateOdds, Category, NormalizedWeights, OddsConfig, calibrate_category, score_category,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::fixtures::{HistoricalYear, historical_years};
use crate::BacktestError;

/// Outcome for one category in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRow {
    pub year: u16,
    pub category_id: String,
    pub nominees: usize,
    pub contenders: usize,
    /// Actual nominees among the top `nominees` by nomination odds.
    pub nominee_hits: usize,
    pub nomination_accuracy: f64,
    pub predicted_winner: String,
    pub actual_winner: Option<String>,
    pub winner_correct: bool,
    pub nomination_brier: f64,
    pub winner_brier: f64,
}

/// Means over a set of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub rows: usize,
    pub nomination_accuracy: f64,
    /// Fraction of rows whose predicted winner won.
    pub winner_accuracy: f64,
    pub nomination_brier: f64,
    pub winner_brier: f64,
}

impl MetricSummary {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a BacktestRow>) -> Self {
        let mut s = Self::default();
        let mut correct = 0usize;
        for r in rows {
            s.rows += 1;
            s.nomination_accuracy += r.nomination_accuracy;
            s.nomination_brier += r.nomination_brier;
            s.winner_brier += r.winner_brier;
            correct += usize::from(r.winner_correct);
        }
        if s.rows > 0 {
            let n = s.rows as f64;
            s.nomination_accuracy /= n;
            s.nomination_brier /= n;
            s.winner_brier /= n;
            s.winner_accuracy = correct as f64 / n;
        }
        s
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: u16,
    pub max: u16,
}

/// Full backtest output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub weights: NormalizedWeights,
    /// `None` only for an empty fixture set.
    pub year_range: Option<YearRange>,
    /// Distinct years in the fixture set.
    pub years: usize,
    pub overall: MetricSummary,
    pub by_category: BTreeMap<String, MetricSummary>,
    pub by_year: BTreeMap<u16, MetricSummary>,
    pub rows: Vec<BacktestRow>,
}

/// Backtest against the embedded fixtures.
pub fn run_backtest(weights: &NormalizedWeights) -> Result<BacktestReport, BacktestError> {
    Ok(run_backtest_on(historical_years()?, weights))
}

/// Backtest against any fixture set. Races without candidates or nominee
/// slots are skipped.
pub fn run_backtest_on(years: &[HistoricalYear], weights: &NormalizedWeights) -> BacktestReport {
    let config = OddsConfig::default();

    let mut rows = Vec::new();
    for y in years {
        for cat in &y.categories {
            match evaluate_race(y.year, cat, weights, &config) {
                Some(row) => rows.push(row),
                None => debug!(year = y.year, category = %cat.id, "empty race skipped"),
            }
        }
    }

    let overall = MetricSummary::from_rows(&rows);

    let mut by_category: BTreeMap<String, Vec<&BacktestRow>> = BTreeMap::new();
    let mut by_year: BTreeMap<u16, Vec<&BacktestRow>> = BTreeMap::new();
    for r in &rows {
        by_category.entry(r.category_id.clone()).or_default().push(r);
        by_year.entry(r.year).or_default().push(r);
    }
    let by_category = by_category
        .into_iter()
        .map(|(k, v)| (k, MetricSummary::from_rows(v)))
        .collect();
    let by_year: BTreeMap<u16, MetricSummary> = by_year
        .into_iter()
        .map(|(k, v)| (k, MetricSummary::from_rows(v)))
        .collect();

    let year_range = years
        .iter()
        .map(|y| y.year)
        .fold(None, |acc: Option<YearRange>, year| {
            Some(match acc {
                None => YearRange {
                    min: year,
                    max: year,
                },
                Some(r) => YearRange {
                    min: r.min.min(year),
                    max: r.max.max(year),
                },
            })
        });
    let mut distinct: Vec<u16> = years.iter().map(|y| y.year).collect();
    distinct.sort_unstable();
    distinct.dedup();

    info!(
        rows = overall.rows,
        years = distinct.len(),
        nomination_accuracy = overall.nomination_accuracy,
        winner_accuracy = overall.winner_accuracy,
        "backtest complete"
    );

    BacktestReport {
        weights: *weights,
        year_range,
        years: distinct.len(),
        overall,
        by_category,
        by_year,
        rows,
    }
}

fn evaluate_race(
    year: u16,
    category: &Category,
    weights: &NormalizedWeights,
    config: &OddsConfig,
) -> Option<BacktestRow> {
    if category.candidates.is_empty() || category.nominees == 0 {
        return None;
    }

    let scores = score_category(category, weights, None);
    let odds = calibrate_category(category, &scores, config);
    let truth = |i: usize| {
        let c = &category.candidates[i];
        (c.nominated.unwrap_or(false), c.winner.unwrap_or(false))
    };

    // Stable sort: ties keep fixture order.
    let mut ranked: Vec<usize> = (0..odds.len()).collect();
    ranked.sort_by(|&a, &b| odds[b].nomination.total_cmp(&odds[a].nomination));
    let slots = category.nominees;
    let nominee_hits = ranked.iter().take(slots).filter(|&&i| truth(i).0).count();

    let predicted = top_winner(&odds)?;
    let actual_winner = category
        .candidates
        .iter()
        .find(|c| c.winner == Some(true))
        .map(|c| c.title.clone());

    let n = odds.len() as f64;
    let brier = |p: f64, hit: bool| (p / 100.0 - f64::from(u8::from(hit))).powi(2);
    let nomination_brier = (0..odds.len())
        .map(|i| brier(odds[i].nomination, truth(i).0))
        .sum::<f64>()
        / n;
    let winner_brier = (0..odds.len())
        .map(|i| brier(odds[i].winner, truth(i).1))
        .sum::<f64>()
        / n;

    Some(BacktestRow {
        year,
        category_id: category.id.clone(),
        nominees: slots,
        contenders: odds.len(),
        nominee_hits,
        nomination_accuracy: nominee_hits as f64 / slots as f64,
        predicted_winner: odds[predicted].title.clone(),
        actual_winner,
        winner_correct: truth(predicted).1,
        nomination_brier,
        winner_brier,
    })
}

/// Index of the highest win odds; the earliest entry wins a tie.
fn top_winner(odds: &[CandidateOdds]) -> Option<usize> {
    odds.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, o)| match best {
            Some((_, w)) if w >= o.winner => best,
            _ => Some((i, o.winner)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oscarcast_core::{Candidate, Strength};

    fn report() -> BacktestReport {
        run_backtest(&NormalizedWeights::default()).unwrap()
    }

    fn tiny_year(year: u16, candidates: Vec<Candidate>) -> HistoricalYear {
        HistoricalYear {
            year,
            ceremony: year - 1927,
            categories: vec![Category {
                id: "best-actor".into(),
                name: "Best Actor".into(),
                nominees: 2,
                winner_base: 0.55,
                candidates,
            }],
        }
    }

    fn labelled(title: &str, p: i32, nominated: bool, winner: bool) -> Candidate {
        let mut c = Candidate::new(title, "Film").with_features(p, 50, 50);
        c.nominated = Some(nominated);
        c.winner = Some(winner);
        c
    }

    #[test]
    fn full_fixture_set_gives_150_rows() {
        let r = report();
        assert_eq!(r.rows.len(), 150);
        assert_eq!(r.overall.rows, 150);
        assert_eq!(r.years, 25);
        assert_eq!(r.year_range, Some(YearRange { min: 1999, max: 2023 }));
        assert_eq!(r.by_category.len(), 6);
        assert_eq!(r.by_year.len(), 25);
        assert!(r.by_category.values().all(|s| s.rows == 25));
        assert!(r.by_year.values().all(|s| s.rows == 6));
    }

    #[test]
    fn metrics_are_probabilities() {
        let r = report();
        for row in &r.rows {
            let ctx = format!("{} {}", row.year, row.category_id);
            assert!((0.0..=1.0).contains(&row.nomination_accuracy), "{ctx}");
            assert!((0.0..=1.0).contains(&row.nomination_brier), "{ctx}");
            assert!((0.0..=1.0).contains(&row.winner_brier), "{ctx}");
            assert!(row.nominee_hits <= row.nominees);
        }
        for s in std::iter::once(&r.overall).chain(r.by_category.values()) {
            assert!((0.0..=1.0).contains(&s.winner_accuracy));
            assert!((0.0..=1.0).contains(&s.nomination_accuracy));
        }
    }

    #[test]
    fn deterministic() {
        let w = NormalizedWeights::default();
        assert_eq!(run_backtest(&w).unwrap(), run_backtest(&w).unwrap());
    }

    #[test]
    fn american_beauty_tops_1999() {
        let r = report();
        let row = r
            .rows
            .iter()
            .find(|row| row.year == 1999 && row.category_id == "best-picture")
            .unwrap();
        assert_eq!(row.predicted_winner, "American Beauty");
        assert_eq!(row.actual_winner.as_deref(), Some("American Beauty"));
        assert!(row.winner_correct);
    }

    #[test]
    fn weights_are_echoed() {
        let w = NormalizedWeights::from_raw(1, 1, 1).unwrap();
        let r = run_backtest(&w).unwrap();
        assert_eq!(r.weights, w);
    }

    #[test]
    fn missing_category_is_skipped() {
        let mut years = historical_years().unwrap().to_vec();
        years[3].categories.retain(|c| c.id != "best-actress");
        let r = run_backtest_on(&years, &NormalizedWeights::default());
        assert_eq!(r.rows.len(), 149);
        assert_eq!(r.by_category["best-actress"].rows, 24);
        assert_eq!(r.by_year[&years[3].year].rows, 5);
    }

    #[test]
    fn empty_race_is_skipped() {
        let years = vec![tiny_year(2000, vec![])];
        let r = run_backtest_on(&years, &NormalizedWeights::default());
        assert!(r.rows.is_empty());
        assert_eq!(r.overall, MetricSummary::default());
        assert_eq!(r.years, 1);
    }

    #[test]
    fn perfect_race_scores_full_accuracy() {
        let years = vec![tiny_year(
            2000,
            vec![
                labelled("Front", 95, true, true),
                labelled("Second", 80, true, false),
                labelled("Snub", 10, false, false),
            ],
        )];
        let r = run_backtest_on(&years, &NormalizedWeights::default());
        let row = &r.rows[0];
        assert_eq!(row.nominee_hits, 2);
        assert_eq!(row.nomination_accuracy, 1.0);
        assert!(row.winner_correct);
        assert_eq!(row.predicted_winner, "Front");
    }

    #[test]
    fn upset_counts_as_a_miss() {
        let years = vec![tiny_year(
            2000,
            vec![
                labelled("Favourite", 95, true, false),
                labelled("Upset", 60, true, true),
                labelled("Snub", 70, false, false),
            ],
        )];
        let r = run_backtest_on(&years, &NormalizedWeights::default());
        let row = &r.rows[0];
        assert!(!row.winner_correct);
        assert_eq!(row.predicted_winner, "Favourite");
        assert_eq!(row.nominee_hits, 1);
        assert_eq!(row.nomination_accuracy, 0.5);
        assert_eq!(r.overall.winner_accuracy, 0.0);
    }

    #[test]
    fn ties_go_to_fixture_order() {
        let twin = |t: &str, winner: bool| {
            let mut c = labelled(t, 70, true, winner).with_strength(Strength::Medium);
            c.studio = "Same".into();
            c
        };
        let years = vec![tiny_year(2000, vec![twin("First", false), twin("Second", true)])];
        let r = run_backtest_on(&years, &NormalizedWeights::default());
        assert_eq!(r.rows[0].predicted_winner, "First");
        assert!(!r.rows[0].winner_correct);
    }
}
