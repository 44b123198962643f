//! Merging external source-signal snapshots into candidate features.
//!
//! Snapshots come from an upstream crawler on an unspecified cadence. Polling
//! an unchanged upstream is the steady state, so an already-applied or
//! malformed snapshot is reported as `changed: false` rather than an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::model::clamp_feature;
use crate::title::normalize_title;
use crate::{Candidate, Category, Strength};

/// Field holding the per-title aggregates.
const AGGREGATES_FIELD: &str = "aggregates";

/// One title's aggregate scores, each clamped into [0, 1] on parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAggregate {
    pub title: String,
    pub combined_score: f64,
    pub letterboxd_score: f64,
    pub reddit_score: f64,
    pub thegamer_score: f64,
}

/// An external aggregate snapshot, keyed by its `generated_at` identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub generated_at: String,
    pub aggregates: Vec<SourceAggregate>,
}

/// Result of [`apply_source_signals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalUpdate {
    pub changed: bool,
    pub updated_count: usize,
    /// Identity to remember as last applied. Unchanged on rejection.
    pub applied_snapshot_id: Option<String>,
}

impl SignalUpdate {
    fn rejected(last_applied: Option<&str>) -> Self {
        Self {
            changed: false,
            updated_count: 0,
            applied_snapshot_id: last_applied.map(str::to_string),
        }
    }
}

/// Read a score, coercing anything non-numeric to 0 and clamping into [0, 1].
fn unit_score(entry: &Value, key: &str) -> f64 {
    let v = match entry.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

/// Snapshot identity as a string; falsy values (`""`, `0`, `null`) give `None`.
fn identity(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

impl SourceSnapshot {
    /// Tolerant parse of an upstream snapshot.
    ///
    /// Returns `None` when the value is not an object, has no array-typed
    /// `aggregates` field, or has a falsy `generatedAt`. Aggregate entries
    /// without a string title are skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let generated_at = identity(obj.get("generatedAt").or_else(|| obj.get("generated_at")))?;
        let entries = obj.get(AGGREGATES_FIELD)?.as_array()?;

        let aggregates = entries
            .iter()
            .filter_map(|entry| {
                let title = entry.get("title")?.as_str()?.to_string();
                Some(SourceAggregate {
                    title,
                    combined_score: unit_score(entry, "combinedScore"),
                    letterboxd_score: unit_score(entry, "letterboxdScore"),
                    reddit_score: unit_score(entry, "redditScore"),
                    thegamer_score: unit_score(entry, "thegamerScore"),
                })
            })
            .collect();

        Some(Self {
            generated_at,
            aggregates,
        })
    }

    /// Normalised title → aggregate. The first occurrence of a key wins.
    ///
    /// Titles that normalise to nothing are left out so they cannot match
    /// candidates with an empty studio.
    fn lookup(&self) -> HashMap<String, &SourceAggregate> {
        let mut map = HashMap::with_capacity(self.aggregates.len());
        for agg in &self.aggregates {
            let key = normalize_title(&agg.title);
            if !key.is_empty() {
                map.entry(key).or_insert(agg);
            }
        }
        map
    }
}

/// Round half up: 2.5 → 3, −2.5 → −2.
fn round_half_up(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}

fn bump(feature: &mut i32, delta: f64) {
    *feature = clamp_feature(clamp_feature(*feature) + round_half_up(delta));
}

/// Strength tier implied by clamped combined and reddit scores.
pub fn classify_strength(combined: f64, reddit: f64) -> Strength {
    if combined >= 0.7 || reddit >= 0.75 {
        Strength::High
    } else if combined >= 0.45 {
        Strength::Medium
    } else {
        Strength::Low
    }
}

/// Fold one aggregate into a candidate's features.
pub fn apply_aggregate(candidate: &mut Candidate, agg: &SourceAggregate) {
    let combined = agg.combined_score.clamp(0.0, 1.0);
    let letterboxd = agg.letterboxd_score.clamp(0.0, 1.0);
    let reddit = agg.reddit_score.clamp(0.0, 1.0);
    let thegamer = agg.thegamer_score.clamp(0.0, 1.0);

    bump(&mut candidate.precursor, (combined - 0.35) * 10.0);
    bump(&mut candidate.history, (letterboxd + thegamer - 0.55) * 8.0);
    bump(&mut candidate.buzz, (reddit + thegamer - 0.5) * 10.0);
    candidate.strength = classify_strength(combined, reddit);
}

/// Apply a typed snapshot. See [`apply_source_signals`].
pub fn apply_snapshot(
    categories: &mut [Category],
    snapshot: &SourceSnapshot,
    last_applied: Option<&str>,
) -> SignalUpdate {
    if snapshot.generated_at.is_empty() || last_applied == Some(snapshot.generated_at.as_str()) {
        debug!(snapshot = %snapshot.generated_at, "snapshot already applied or unidentified");
        return SignalUpdate::rejected(last_applied);
    }

    let lookup = snapshot.lookup();
    let mut updated = 0usize;
    for category in categories.iter_mut() {
        for candidate in category.candidates.iter_mut() {
            let agg = lookup
                .get(&normalize_title(&candidate.title))
                .or_else(|| lookup.get(&normalize_title(&candidate.studio)));
            if let Some(agg) = agg {
                apply_aggregate(candidate, agg);
                updated += 1;
            }
        }
    }

    if updated == 0 {
        debug!(snapshot = %snapshot.generated_at, "snapshot matched no candidates");
        return SignalUpdate::rejected(last_applied);
    }

    info!(snapshot = %snapshot.generated_at, updated, "applied source snapshot");
    SignalUpdate {
        changed: true,
        updated_count: updated,
        applied_snapshot_id: Some(snapshot.generated_at.clone()),
    }
}

/// Merge an upstream snapshot into every candidate of every category.
///
/// Candidates match by normalised title first, then by normalised studio,
/// so a performer picks up signal keyed by their film. Malformed snapshots,
/// falsy identities and the identity in `last_applied` are rejected without
/// touching any candidate.
pub fn apply_source_signals(
    categories: &mut [Category],
    snapshot: &Value,
    last_applied: Option<&str>,
) -> SignalUpdate {
    match SourceSnapshot::from_value(snapshot) {
        Some(parsed) => apply_snapshot(categories, &parsed, last_applied),
        None => {
            debug!("rejected malformed source snapshot");
            SignalUpdate::rejected(last_applied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn categories() -> Vec<Category> {
        vec![
            Category {
                id: "best-picture".into(),
                name: "Best Picture".into(),
                nominees: 10,
                winner_base: 0.35,
                candidates: vec![
                    Candidate::new("Oppenheimer", "Universal").with_features(80, 60, 70),
                    Candidate::new("Past Lives", "A24").with_features(50, 40, 45),
                ],
            },
            Category {
                id: "best-actor".into(),
                name: "Best Actor".into(),
                nominees: 5,
                winner_base: 0.55,
                candidates: vec![
                    Candidate::new("Cillian Murphy", "Oppenheimer").with_features(85, 50, 60),
                    Candidate::new("Colman Domingo", "Rustin").with_features(55, 40, 35),
                ],
            },
        ]
    }

    fn snapshot(id: &str) -> Value {
        json!({
            "generatedAt": id,
            "aggregates": [
                {"title": "Oppenheimer (2023)", "combinedScore": 0.8, "letterboxdScore": 0.6,
                 "redditScore": 0.5, "thegamerScore": 0.3},
                {"title": "oppenheimer", "combinedScore": 0.0, "letterboxdScore": 0.0,
                 "redditScore": 0.0, "thegamerScore": 0.0},
                {"title": "Past Lives", "combinedScore": 0.2, "letterboxdScore": 2.0,
                 "redditScore": -1.0, "thegamerScore": "0.1"}
            ]
        })
    }

    #[test]
    fn applies_and_reclassifies() {
        let mut cats = categories();
        let out = apply_source_signals(&mut cats, &snapshot("2024-01-20T10:00:00Z"), None);
        assert!(out.changed);
        assert_eq!(out.applied_snapshot_id.as_deref(), Some("2024-01-20T10:00:00Z"));
        // Oppenheimer film + Cillian Murphy (via studio) + Past Lives.
        assert_eq!(out.updated_count, 3);

        let opp = &cats[0].candidates[0];
        assert_eq!(opp.precursor, 80 + 5); // (0.8-0.35)*10 = 4.5 → 5
        assert_eq!(opp.history, 60 + 3); // (0.6+0.3-0.55)*8 = 2.8 → 3
        assert_eq!(opp.buzz, 70 + 3); // (0.5+0.3-0.5)*10 = 3
        assert_eq!(opp.strength, Strength::High);

        let murphy = &cats[1].candidates[0];
        assert_eq!(murphy.precursor, 90);
        assert_eq!(murphy.strength, Strength::High);
        assert_eq!(cats[1].candidates[1].precursor, 55, "Domingo unmatched");
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let mut cats = categories();
        apply_source_signals(&mut cats, &snapshot("s1"), None);
        let pl = &cats[0].candidates[1];
        // combined 0.2 → (−0.15)*10 = −1.5 → −1 (half up)
        assert_eq!(pl.precursor, 49);
        // letterboxd clamps to 1.0: (1.0+0.1−0.55)*8 = 4.4 → 4
        assert_eq!(pl.history, 44);
        // reddit clamps to 0.0: (0+0.1−0.5)*10 = −4
        assert_eq!(pl.buzz, 41);
        assert_eq!(pl.strength, Strength::Low);
    }

    #[test]
    fn same_identity_is_idempotent() {
        let mut cats = categories();
        let first = apply_source_signals(&mut cats, &snapshot("s1"), None);
        assert!(first.changed);
        let after_first = cats.clone();

        let second = apply_source_signals(
            &mut cats,
            &snapshot("s1"),
            first.applied_snapshot_id.as_deref(),
        );
        assert!(!second.changed);
        assert_eq!(second.updated_count, 0);
        assert_eq!(second.applied_snapshot_id.as_deref(), Some("s1"));
        assert_eq!(cats, after_first);
    }

    #[test]
    fn malformed_snapshots_rejected() {
        let original = categories();
        for bad in [
            json!(null),
            json!([1, 2, 3]),
            json!({"generatedAt": "s1"}),
            json!({"generatedAt": "s1", "aggregates": {"title": "Oppenheimer"}}),
            json!({"generatedAt": "", "aggregates": []}),
            json!({"generatedAt": 0, "aggregates": []}),
            json!({"aggregates": [{"title": "Oppenheimer", "combinedScore": 1.0}]}),
        ] {
            let mut cats = original.clone();
            let out = apply_source_signals(&mut cats, &bad, Some("prev"));
            assert!(!out.changed, "accepted {bad}");
            assert_eq!(out.applied_snapshot_id.as_deref(), Some("prev"));
            assert_eq!(cats, original);
        }
    }

    #[test]
    fn no_match_behaves_as_rejection() {
        let mut cats = categories();
        let snap = json!({
            "generatedAt": "s2",
            "aggregates": [{"title": "Some Other Film", "combinedScore": 0.9}]
        });
        let out = apply_source_signals(&mut cats, &snap, None);
        assert!(!out.changed);
        assert!(out.applied_snapshot_id.is_none());
        assert_eq!(cats, categories());
    }

    #[test]
    fn first_duplicate_key_wins() {
        let snap = SourceSnapshot::from_value(&snapshot("s1")).unwrap();
        let lookup = snap.lookup();
        assert_eq!(lookup["oppenheimer"].combined_score, 0.8);
    }

    #[test]
    fn numeric_identity_accepted() {
        let value = json!({"generatedAt": 1706000000, "aggregates": []});
        let snap = SourceSnapshot::from_value(&value);
        assert_eq!(snap.unwrap().generated_at, "1706000000");
    }

    #[test]
    fn features_stay_in_bounds() {
        let mut cats = categories();
        cats[0].candidates[0].precursor = 99;
        cats[0].candidates[1].buzz = 1;
        apply_source_signals(&mut cats, &snapshot("s1"), None);
        assert_eq!(cats[0].candidates[0].precursor, 100);
        assert_eq!(cats[0].candidates[1].buzz, 0);
    }

    #[test]
    fn extreme_loaded_features_do_not_overflow() {
        let mut cats = categories();
        cats[0].candidates[0].precursor = i32::MAX;
        cats[0].candidates[0].history = i32::MIN;
        let snap = json!({
            "generatedAt": "s1",
            "aggregates": [{"title": "Oppenheimer", "combinedScore": 1.0}]
        });
        let out = apply_source_signals(&mut cats, &snap, None);
        assert!(out.changed);
        // combined 1.0 adds 7 to a value already held at 100.
        assert_eq!(cats[0].candidates[0].precursor, 100);
        // letterboxd and thegamer default to 0: round(-4.4) = -4 from a floor of 0.
        assert_eq!(cats[0].candidates[0].history, 0);
    }

    #[test]
    fn blank_titles_never_match_empty_studio() {
        let mut cats = vec![Category {
            id: "best-picture".into(),
            name: String::new(),
            nominees: 5,
            winner_base: 0.35,
            candidates: vec![Candidate::new("Untitled Project", "").with_features(50, 50, 50)],
        }];
        let snap = json!({
            "generatedAt": "s3",
            "aggregates": [{"title": "[tbd]", "combinedScore": 1.0}]
        });
        let out = apply_source_signals(&mut cats, &snap, None);
        assert!(!out.changed);
        assert_eq!(cats[0].candidates[0].precursor, 50);
    }

    #[test]
    fn strength_thresholds() {
        assert_eq!(classify_strength(0.7, 0.0), Strength::High);
        assert_eq!(classify_strength(0.1, 0.75), Strength::High);
        assert_eq!(classify_strength(0.45, 0.0), Strength::Medium);
        assert_eq!(classify_strength(0.44, 0.74), Strength::Low);
    }
}
