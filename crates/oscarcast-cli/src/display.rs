//! Tabular output for odds and backtest reports.
//!
//! Each table is built as an Arrow `RecordBatch` and rendered with Arrow's
//! pretty printer.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use oscarcast_backtest::{BacktestReport, BacktestRow, MetricSummary};
use oscarcast_core::CategoryOdds;

/// Round for display: percentages to one decimal, metrics to three.
fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

fn f64_col(values: impl Iterator<Item = f64>, places: i32) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(values.map(|v| round_to(v, places))))
}

fn str_col<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(values))
}

// ── Odds ──

pub fn odds_batch(odds: &CategoryOdds) -> Result<RecordBatch, ArrowError> {
    let c = &odds.candidates;
    let schema = Schema::new(vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("studio", DataType::Utf8, false),
        Field::new("strength", DataType::Utf8, false),
        Field::new("nomination_pct", DataType::Float64, false),
        Field::new("win_pct", DataType::Float64, false),
        Field::new("precursor", DataType::Float64, false),
        Field::new("history", DataType::Float64, false),
        Field::new("buzz", DataType::Float64, false),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            str_col(c.iter().map(|o| o.title.as_str())),
            str_col(c.iter().map(|o| o.studio.as_str())),
            str_col(c.iter().map(|o| o.strength.as_str())),
            f64_col(c.iter().map(|o| o.nomination), 1),
            f64_col(c.iter().map(|o| o.winner), 1),
            f64_col(c.iter().map(|o| o.contributions.precursor), 2),
            f64_col(c.iter().map(|o| o.contributions.history), 2),
            f64_col(c.iter().map(|o| o.contributions.buzz), 2),
        ],
    )
}

pub fn print_category_odds(odds: &CategoryOdds) -> anyhow::Result<()> {
    let total_nom: f64 = odds.candidates.iter().map(|c| c.nomination).sum();
    let total_win: f64 = odds.candidates.iter().map(|c| c.winner).sum();
    println!("=== {} ===", if odds.name.is_empty() { &odds.category_id } else { &odds.name });
    println!("{}", pretty_format_batches(&[odds_batch(odds)?])?);
    println!("  nomination total {total_nom:.1}%  win total {total_win:.1}%");
    println!();
    Ok(())
}

// ── Backtest ──

pub fn summary_batch<'a>(
    key_name: &str,
    entries: impl IntoIterator<Item = (String, &'a MetricSummary)>,
) -> Result<RecordBatch, ArrowError> {
    let (keys, stats): (Vec<String>, Vec<&MetricSummary>) = entries.into_iter().unzip();
    let schema = Schema::new(vec![
        Field::new(key_name, DataType::Utf8, false),
        Field::new("rows", DataType::UInt64, false),
        Field::new("nomination_accuracy", DataType::Float64, false),
        Field::new("winner_accuracy", DataType::Float64, false),
        Field::new("nomination_brier", DataType::Float64, false),
        Field::new("winner_brier", DataType::Float64, false),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            str_col(keys.iter().map(String::as_str)),
            Arc::new(UInt64Array::from_iter_values(
                stats.iter().map(|s| s.rows as u64),
            )),
            f64_col(stats.iter().map(|s| s.nomination_accuracy), 3),
            f64_col(stats.iter().map(|s| s.winner_accuracy), 3),
            f64_col(stats.iter().map(|s| s.nomination_brier), 3),
            f64_col(stats.iter().map(|s| s.winner_brier), 3),
        ],
    )
}

/// Races where the predicted winner lost.
pub fn misses_batch<'a>(
    rows: impl IntoIterator<Item = &'a BacktestRow>,
) -> Result<RecordBatch, ArrowError> {
    let misses: Vec<&BacktestRow> = rows.into_iter().filter(|r| !r.winner_correct).collect();
    let schema = Schema::new(vec![
        Field::new("year", DataType::UInt64, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("predicted", DataType::Utf8, false),
        Field::new("actual", DataType::Utf8, true),
        Field::new("all_nominees_hit", DataType::Boolean, false),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(UInt64Array::from_iter_values(
                misses.iter().map(|r| u64::from(r.year)),
            )),
            str_col(misses.iter().map(|r| r.category_id.as_str())),
            str_col(misses.iter().map(|r| r.predicted_winner.as_str())),
            Arc::new(StringArray::from_iter(
                misses.iter().map(|r| r.actual_winner.as_deref()),
            )),
            Arc::new(BooleanArray::from_iter(
                misses.iter().map(|r| Some(r.nominee_hits == r.nominees)),
            )),
        ],
    )
}

pub fn print_backtest(report: &BacktestReport, by_year: bool) -> anyhow::Result<()> {
    let w = &report.weights;
    match report.year_range {
        Some(range) => println!(
            "Backtest {}–{} ({} years, {} races)",
            range.min, range.max, report.years, report.overall.rows
        ),
        None => println!("Backtest: no fixture years"),
    }
    println!(
        "  weights precursor {:.3}  history {:.3}  buzz {:.3}",
        w.precursor, w.history, w.buzz
    );
    println!();

    let overall = std::iter::once(("overall".to_string(), &report.overall));
    let categories = report.by_category.iter().map(|(k, v)| (k.clone(), v));
    println!(
        "{}",
        pretty_format_batches(&[summary_batch("category", categories.chain(overall))?])?
    );

    if by_year {
        let years = report.by_year.iter().map(|(k, v)| (k.to_string(), v));
        println!("{}", pretty_format_batches(&[summary_batch("year", years)?])?);
    }

    let misses = misses_batch(&report.rows)?;
    if misses.num_rows() > 0 {
        println!("Missed winners");
        println!("{}", pretty_format_batches(&[misses])?);
    }
    Ok(())
}
