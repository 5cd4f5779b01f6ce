//! CLI configuration for the walk-forward optimizer binary.

use crate::application::wfo::backtest::BacktestConfig;
use crate::application::wfo::driver::DriverConfig;
use crate::application::wfo::risk::RiskConfig;
use crate::domain::wfo::ga::GaConfig;
use crate::domain::wfo::regime::RegimeThresholds;
use crate::domain::wfo::timeframe::Timeframe;
use crate::domain::wfo::windows::WindowConfig;
use clap::Parser;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Walk-forward optimizer: rolls a genetic-algorithm parameter search across
/// a symbol's candle history one calendar window at a time.
#[derive(Parser, Debug, Clone, Serialize)]
#[command(author, version, about = "Walk-forward optimizer", long_about = None)]
pub struct WfoConfig {
    /// Path to the candle CSV file (no header, fields by position).
    #[arg(long)]
    pub data_path: String,

    /// Symbol tag attached to generated signals and trades.
    #[arg(long, default_value = "BTCUSDT")]
    pub symbol: String,

    /// Candle timeframe (5m, 15m, 1h, 4h).
    #[arg(long, default_value = "4h")]
    pub timeframe: String,

    /// Calendar year the rolling windows are carved from.
    #[arg(long)]
    pub year: i32,

    /// Training-segment length, in months.
    #[arg(long, default_value_t = 4)]
    pub train_months: u32,

    /// Test-segment length, in months.
    #[arg(long, default_value_t = 1)]
    pub test_months: u32,

    /// Months to advance between windows. Must equal `test_months`.
    #[arg(long, default_value_t = 1)]
    pub step_months: u32,

    /// Bars of history fed to indicators ahead of each window's first bar.
    #[arg(long, default_value_t = 240)]
    pub warmup_bars: usize,

    /// GA population size.
    #[arg(long, default_value_t = 32)]
    pub population: usize,

    /// GA generation count (subject to early stopping).
    #[arg(long, default_value_t = 8)]
    pub generations: usize,

    /// RNG seed. Omit for a non-deterministic run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Starting account balance for the first window.
    #[arg(long, default_value = "10000")]
    pub initial_balance: String,

    /// Per-trade fee rate applied on both entry and exit fills.
    #[arg(long, default_value = "0.001")]
    pub fee_rate: String,

    /// Directory the run's JSON result document is written into.
    #[arg(long, default_value = "wfo_output")]
    pub output_dir: String,

    /// Skip persisting individual trades even for the final test backtest.
    #[arg(long, default_value_t = true)]
    pub optimize_mode: bool,

    /// Evaluate each generation's population across a rayon thread pool.
    #[arg(long, default_value_t = false)]
    pub parallel: bool,
}

impl WfoConfig {
    pub fn timeframe(&self) -> anyhow::Result<Timeframe> {
        Timeframe::from_str(&self.timeframe).map_err(|e| anyhow::anyhow!(e))
    }

    pub fn initial_balance_decimal(&self) -> anyhow::Result<Decimal> {
        Decimal::from_str(&self.initial_balance)
            .map_err(|e| anyhow::anyhow!("invalid --initial-balance: {e}"))
    }

    pub fn fee_rate_decimal(&self) -> anyhow::Result<Decimal> {
        Decimal::from_str(&self.fee_rate).map_err(|e| anyhow::anyhow!("invalid --fee-rate: {e}"))
    }

    pub fn output_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.output_dir).join(format!("wfo_{}_{}.json", self.symbol, self.year))
    }

    /// Assembles the driver configuration this CLI invocation describes.
    pub fn to_driver_config(&self) -> anyhow::Result<DriverConfig> {
        let initial_balance = self.initial_balance_decimal()?;
        let fee_rate = self.fee_rate_decimal()?;

        Ok(DriverConfig {
            window: WindowConfig {
                year: self.year,
                train_months: self.train_months,
                test_months: self.test_months,
                step_months: self.step_months,
                warmup_bars: self.warmup_bars,
            },
            ga: GaConfig {
                population_size: self.population,
                num_generations: self.generations,
                seed: self.seed,
                parallel: self.parallel,
                ..GaConfig::default()
            },
            backtest: BacktestConfig {
                initial_balance,
                fee_rate,
                risk: RiskConfig::default(),
                regime_thresholds: RegimeThresholds::default(),
                fallback_atr_distance: Decimal::from_f64(1.0).unwrap_or(Decimal::ONE),
                optimize_mode: self.optimize_mode,
            },
            symbol: self.symbol.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_required_args() {
        let config = WfoConfig::parse_from([
            "wfo",
            "--data-path",
            "candles.csv",
            "--year",
            "2024",
        ]);
        assert_eq!(config.year, 2024);
        assert_eq!(config.train_months, 4);
        assert_eq!(config.symbol, "BTCUSDT");
    }

    #[test]
    fn test_to_driver_config_resolves_defaults() {
        let config = WfoConfig::parse_from([
            "wfo",
            "--data-path",
            "candles.csv",
            "--year",
            "2024",
        ]);
        let driver = config.to_driver_config().unwrap();
        assert_eq!(driver.window.year, 2024);
        assert_eq!(driver.backtest.initial_balance, Decimal::from_str("10000").unwrap());
    }

    #[test]
    fn test_rejects_malformed_initial_balance() {
        let mut config = WfoConfig::parse_from([
            "wfo",
            "--data-path",
            "candles.csv",
            "--year",
            "2024",
        ]);
        config.initial_balance = "not-a-number".to_string();
        assert!(config.to_driver_config().is_err());
    }
}
