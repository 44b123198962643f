//! Odds for a season file: load inputs, merge signals, score, calibrate and
//! rebalance every category.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use oscarcast_core::{
    CategoryOdds, ExperienceConfig, NormalizedWeights, OddsConfig, Season, SignalUpdate,
    apply_source_signals, evaluate_category,
};
use oscarcast_kernel::{ScoringKernel, score_with};
use tracing::{info, warn};

/// Everything `oscarcast odds` reads from disk.
#[derive(Debug, Clone, Default)]
pub struct OddsInputs {
    pub season: PathBuf,
    pub signals: Option<PathBuf>,
    pub last_snapshot: Option<String>,
    pub config: Option<PathBuf>,
    pub experience: Option<PathBuf>,
}

pub struct SeasonOdds {
    pub categories: Vec<CategoryOdds>,
    pub signals: Option<SignalUpdate>,
}

fn read(path: &Path, what: &str) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {what} {}", path.display()))
}

pub fn load_season(path: &Path) -> anyhow::Result<Season> {
    Season::from_json(&read(path, "season")?)
        .with_context(|| format!("parsing season {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<OddsConfig> {
    let Some(path) = path else {
        return Ok(OddsConfig::default());
    };
    OddsConfig::from_json(&read(path, "odds config")?)
        .with_context(|| format!("parsing odds config {}", path.display()))
}

pub fn load_experience(path: Option<&Path>) -> anyhow::Result<Option<ExperienceConfig>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let config = serde_json::from_str(&read(path, "experience config")?)
        .with_context(|| format!("parsing experience config {}", path.display()))?;
    Ok(Some(config))
}

/// Log how old an applied snapshot is, when its identity is an RFC 3339 timestamp.
fn log_snapshot_age(id: &str) {
    match DateTime::parse_from_rfc3339(id) {
        Ok(at) => {
            let age = Utc::now().signed_duration_since(at.with_timezone(&Utc));
            info!(snapshot = id, age_hours = age.num_hours(), "snapshot age");
            if age.num_days() > 7 {
                warn!(
                    snapshot = id,
                    age_days = age.num_days(),
                    "source snapshot is over a week old"
                );
            }
        }
        Err(_) => info!(snapshot = id, "snapshot identity is not a timestamp"),
    }
}

pub fn evaluate_season(
    inputs: &OddsInputs,
    weights: &NormalizedWeights,
    kernel: &dyn ScoringKernel,
) -> anyhow::Result<SeasonOdds> {
    let mut season = load_season(&inputs.season)?;
    let config = load_config(inputs.config.as_deref())?;
    let experience = load_experience(inputs.experience.as_deref())?;

    let signals = match &inputs.signals {
        Some(path) => {
            let raw: serde_json::Value = serde_json::from_str(&read(path, "snapshot")?)
                .with_context(|| format!("parsing snapshot {}", path.display()))?;
            let update = apply_source_signals(
                &mut season.categories,
                &raw,
                inputs.last_snapshot.as_deref(),
            );
            if update.changed
                && let Some(id) = &update.applied_snapshot_id
            {
                log_snapshot_age(id);
            }
            Some(update)
        }
        None => None,
    };

    let mut categories = Vec::with_capacity(season.categories.len());
    for category in &season.categories {
        let scores = score_with(kernel, category, weights, experience.as_ref())
            .with_context(|| format!("scoring {}", category.id))?;
        categories.push(evaluate_category(category, &scores, &config));
    }
    info!(
        kernel = kernel.name(),
        categories = categories.len(),
        "season evaluated"
    );

    Ok(SeasonOdds {
        categories,
        signals,
    })
}
