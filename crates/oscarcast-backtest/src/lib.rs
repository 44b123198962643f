//! Historical backtest for the Oscarcast scorer.
//!
//! Replays scoring and calibration over 25 labelled ceremonies and reports
//! nomination accuracy, winner accuracy and Brier scores overall, per
//! category and per year.

pub mod cache;
mod error;
pub mod fixtures;
pub mod harness;

pub use cache::{BacktestCache, backtest_result};
pub use error::BacktestError;
pub use fixtures::{HistoricalYear, historical_years, load_years};
pub use harness::{
    BacktestReport, BacktestRow, MetricSummary, YearRange, run_backtest, run_backtest_on,
};
