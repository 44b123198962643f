//! oscarcast: award-season odds and historical backtests.
//!
//! Usage:
//!   oscarcast odds season.json [--signals snapshot.json] [--kernel columnar]
//!   oscarcast backtest [--by-year] [--json]
//!   oscarcast normalize "The Dish [Spielberg Movie]"

mod display;
mod season;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use oscarcast_backtest::{
    BacktestReport, backtest_result, load_years, run_backtest, run_backtest_on,
};
use oscarcast_core::{NormalizedWeights, normalize_title};
use oscarcast_kernel::{ColumnarKernel, ManagedKernel, ScoringKernel};
use tracing_subscriber::EnvFilter;

use crate::season::{OddsInputs, evaluate_season};

#[derive(Parser)]
#[command(name = "oscarcast")]
#[command(about = "Award nomination and win odds with historical backtesting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Raw session weights; normalised by their sum.
#[derive(Args, Debug, Clone, Copy)]
struct WeightArgs {
    /// Precursor-awards weight
    #[arg(long, env = "OSCARCAST_PRECURSOR_WEIGHT", default_value_t = 58)]
    precursor: u32,

    /// Category-history weight
    #[arg(long, env = "OSCARCAST_HISTORY_WEIGHT", default_value_t = 30)]
    history: u32,

    /// Buzz weight
    #[arg(long, env = "OSCARCAST_BUZZ_WEIGHT", default_value_t = 12)]
    buzz: u32,
}

impl WeightArgs {
    fn normalized(&self) -> anyhow::Result<NormalizedWeights> {
        Ok(NormalizedWeights::from_raw(
            self.precursor,
            self.history,
            self.buzz,
        )?)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum KernelKind {
    /// In-process scalar scorer
    Managed,
    /// Arrow columnar batch scorer
    Columnar,
}

#[derive(Subcommand)]
enum Commands {
    /// Calibrated, rebalanced odds for every category in a season file
    Odds {
        /// Season JSON file
        season: PathBuf,

        /// Source-signal snapshot to merge before scoring
        #[arg(long)]
        signals: Option<PathBuf>,

        /// Identity of the snapshot applied last time
        #[arg(long)]
        last_snapshot: Option<String>,

        /// Odds config JSON (curves, bands, winner cap)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Experience config JSON (prior wins, recent winners, overdue)
        #[arg(long)]
        experience: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = KernelKind::Managed)]
        kernel: KernelKind,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        weights: WeightArgs,
    },

    /// Replay the scorer over labelled historical ceremonies
    Backtest {
        /// Fixture JSON to use instead of the embedded set
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Also show per-year metrics
        #[arg(long)]
        by_year: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        weights: WeightArgs,
    },

    /// Print the matching key for a title
    Normalize { title: String },
}

fn build_kernel(kind: KernelKind) -> anyhow::Result<Box<dyn ScoringKernel>> {
    Ok(match kind {
        KernelKind::Managed => Box::new(ManagedKernel),
        KernelKind::Columnar => {
            let mut kernel = ColumnarKernel::new();
            kernel.init().context("initialising columnar kernel")?;
            Box::new(kernel)
        }
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("oscarcast v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Commands::Odds {
            season,
            signals,
            last_snapshot,
            config,
            experience,
            kernel,
            json,
            weights,
        } => {
            let weights = weights.normalized()?;
            let kernel = build_kernel(kernel)?;
            let inputs = OddsInputs {
                season,
                signals,
                last_snapshot,
                config,
                experience,
            };
            let out = evaluate_season(&inputs, &weights, kernel.as_ref())?;

            if json {
                let body = serde_json::json!({
                    "weights": weights,
                    "signals": out.signals,
                    "categories": out.categories,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                if let Some(update) = &out.signals {
                    println!(
                        "signals: changed={} updated={} snapshot={}",
                        update.changed,
                        update.updated_count,
                        update.applied_snapshot_id.as_deref().unwrap_or("-")
                    );
                    println!();
                }
                for cat in &out.categories {
                    display::print_category_odds(cat)?;
                }
            }
        }

        Commands::Backtest {
            fixtures,
            by_year,
            json,
            weights,
        } => {
            let weights = weights.normalized()?;
            let report: Arc<BacktestReport> = match fixtures {
                Some(path) => {
                    let body = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading fixtures {}", path.display()))?;
                    let years = load_years(&body)
                        .with_context(|| format!("parsing fixtures {}", path.display()))?;
                    run_backtest_on(&years, &weights).into()
                }
                None if weights == NormalizedWeights::default() => backtest_result()?,
                None => run_backtest(&weights)?.into(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(report.as_ref())?);
            } else {
                display::print_backtest(&report, by_year)?;
            }
        }

        Commands::Normalize { title } => {
            println!("{}", normalize_title(&title));
        }
    }
    Ok(())
}
