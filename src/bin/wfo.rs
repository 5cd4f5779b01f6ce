//! Walk-forward optimizer binary.
//!
//! Loads a symbol's candle history from CSV, rolls a genetic-algorithm
//! parameter search across calendar windows, and writes the run's
//! `{config, summary, windows}` result document to `--output-dir`.
//!
//! # Usage
//! ```sh
//! cargo run --bin wfo -- --data-path candles.csv --year 2024
//! ```
//!
//! # Environment Variables
//! - `RUST_LOG` - tracing filter directive (default: `info`)

use anyhow::Context;
use clap::Parser;
use wfo_rustrade::config::wfo_config::WfoConfig;
use wfo_rustrade::domain::wfo::alphas::NoopPredictor;
use wfo_rustrade::domain::wfo::errors::NoWindows;
use wfo_rustrade::infrastructure::wfo::csv_loader::load_candles;
use wfo_rustrade::infrastructure::wfo::output_writer::write_run_output;
use tracing::{error, info, Level};
use tracing_subscriber::prelude::*;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = WfoConfig::parse();
    info!(
        symbol = %config.symbol,
        year = config.year,
        timeframe = %config.timeframe,
        "wfo starting"
    );

    match run(&config) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("wfo failed: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(config: &WfoConfig) -> anyhow::Result<()> {
    let timeframe = config.timeframe()?;
    let candles = load_candles(&config.data_path, timeframe)
        .context("failed to load candle data")?;
    info!(candles = candles.len(), "loaded candles");

    let driver_config = config.to_driver_config()?;
    let predictor = NoopPredictor;

    let output = match wfo_rustrade::application::wfo::driver::run_wfo(&candles, &driver_config, &predictor) {
        Ok(output) => output,
        Err(NoWindows::StepMismatch { step_months, test_months }) => {
            anyhow::bail!(
                "step_months ({step_months}) must equal test_months ({test_months})"
            );
        }
        Err(NoWindows::InsufficientMonths { year, train_months, test_months }) => {
            anyhow::bail!(
                "year {year} cannot fit train={train_months}mo + test={test_months}mo windows (need <= 12 months total)"
            );
        }
    };

    info!(
        windows = output.windows.len(),
        final_balance = output.summary.final_balance,
        pass_rate = output.summary.pass_rate,
        "wfo complete"
    );

    std::fs::create_dir_all(&config.output_dir).context("failed to create output directory")?;
    let path = config.output_path();
    write_run_output(&path, config, &output).context("failed to write run output")?;
    info!(path = %path.display(), "wrote run output");

    Ok(())
}
