//! Labelled historical ceremonies.
//!
//! The embedded set covers the 1999–2023 film years (72nd–96th ceremonies)
//! across the six headline categories. Candidates carry `nominated` and
//! `winner` ground truth, plus one or two contenders per race that missed
//! out on a nomination.

use std::sync::OnceLock;

use oscarcast_core::Category;
use serde::{Deserialize, Serialize};

use crate::BacktestError;

const EMBEDDED: &str = include_str!("../data/historical.json");

/// One ceremony, keyed by film year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalYear {
    pub year: u16,
    pub ceremony: u16,
    pub categories: Vec<Category>,
}

impl HistoricalYear {
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// Parse a fixture file: a JSON array of [`HistoricalYear`].
pub fn load_years(json: &str) -> Result<Vec<HistoricalYear>, BacktestError> {
    Ok(serde_json::from_str(json)?)
}

/// The embedded fixture set, parsed once per process.
pub fn historical_years() -> Result<&'static [HistoricalYear], BacktestError> {
    static YEARS: OnceLock<Result<Vec<HistoricalYear>, String>> = OnceLock::new();
    match YEARS.get_or_init(|| load_years(EMBEDDED).map_err(|e| e.to_string())) {
        Ok(years) => Ok(years),
        Err(msg) => Err(BacktestError::EmbeddedFixtures(msg.clone())),
    }
}
