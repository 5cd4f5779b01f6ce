//! The walk-forward driver: per window, runs the GA against SubTrain/ValTrain
//! backtests, then backtests the winner once on the untouched test segment
//! and compounds equity forward into the next window.

use super::backtest::{run_backtest, BacktestConfig};
use rust_decimal::prelude::ToPrimitive;
use crate::domain::wfo::alphas::PredictProba;
use crate::domain::wfo::candle::Candle;
use crate::domain::wfo::errors::NoWindows;
use crate::domain::wfo::fitness::compute_fitness;
use crate::domain::wfo::ga::{self, GaConfig, GenerationRecord};
use crate::domain::wfo::param_space::{ParamSpace, ParamVec};
use crate::domain::wfo::windows::{generate_windows, split_train, Window, WindowConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub window: WindowConfig,
    pub ga: GaConfig,
    pub backtest: BacktestConfig,
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowResult {
    pub label: String,
    pub train_fitness: f64,
    pub test_return: f64,
    pub test_pf: f64,
    pub test_sharpe: f64,
    pub test_maxdd: f64,
    pub test_trades: usize,
    pub test_win_rate: f64,
    pub start_balance: f64,
    pub end_balance: f64,
    pub optimal_params: ParamVec,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub total_return_pct: f64,
    pub avg_test_pf: f64,
    pub median_test_pf: f64,
    pub pass_rate: f64,
    pub std_log_pf: f64,
    pub failing_windows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub summary: RunSummary,
    pub windows: Vec<WindowResult>,
}

fn test_win_rate(closed_pnls: &[Decimal]) -> f64 {
    if closed_pnls.is_empty() {
        return 0.0;
    }
    let wins = closed_pnls.iter().filter(|&&p| p > Decimal::ZERO).count();
    wins as f64 / closed_pnls.len() as f64
}

/// Runs the full walk-forward pipeline over `candles` and returns the
/// per-window results plus the end-of-run summary.
pub fn run_wfo(
    candles: &[Candle],
    config: &DriverConfig,
    predictor: &dyn PredictProba,
) -> Result<RunOutput, NoWindows> {
    let space = ParamSpace::default();
    let windows = generate_windows(candles, &config.window)?;

    let initial_balance = config.backtest.initial_balance;
    let mut cumulative_balance = initial_balance;
    let mut results = Vec::with_capacity(windows.len());

    for window in &windows {
        let started = std::time::Instant::now();
        let mut result = run_window(window, config, &space, cumulative_balance, predictor);
        result.elapsed_secs = started.elapsed().as_secs_f64();
        cumulative_balance = Decimal::try_from(result.end_balance).unwrap_or(cumulative_balance);
        info!(
            window = %result.label,
            test_pf = result.test_pf,
            end_balance = result.end_balance,
            elapsed_secs = result.elapsed_secs,
            "window complete"
        );
        results.push(result);
    }

    let summary = summarize(initial_balance, cumulative_balance, &results);
    Ok(RunOutput {
        summary,
        windows: results,
    })
}

fn run_window(
    window: &Window,
    config: &DriverConfig,
    space: &ParamSpace,
    start_balance: Decimal,
    predictor: &dyn PredictProba,
) -> WindowResult {
    let (sub_train, val_train) = split_train(&window.train_data, window.train_end_month - window.train_start_month + 1);

    let window_warmup = window.warmup_data.clone();
    let backtest_config = BacktestConfig {
        initial_balance: start_balance,
        ..config.backtest.clone()
    };

    let fitness_fn = |params: &ParamVec| -> f64 {
        let sub_outcome = run_backtest(
            &config.symbol,
            &window_warmup,
            sub_train,
            params,
            &backtest_config,
            predictor,
        );
        let val_outcome = run_backtest(
            &config.symbol,
            &window_warmup,
            val_train,
            params,
            &backtest_config,
            predictor,
        );
        compute_fitness(space, params, &sub_outcome.metrics, &val_outcome.metrics)
    };

    let (best, _history): (_, Vec<GenerationRecord>) = ga::optimize(space, &config.ga, fitness_fn);

    let test_config = BacktestConfig {
        initial_balance: start_balance,
        ..config.backtest.clone()
    };
    // The test backtest gets its own broker seeded at `start_balance`, run
    // through the same warmup prefix so indicators are warm at the first
    // test bar.
    let test_outcome = run_backtest(
        &config.symbol,
        &window.warmup_data,
        &window.test_data,
        &best.params,
        &test_config,
        predictor,
    );

    let end_balance = start_balance
        + Decimal::try_from(test_outcome.metrics.return_pct).unwrap_or(Decimal::ZERO) * start_balance;

    WindowResult {
        label: window.label.clone(),
        train_fitness: best.fitness.unwrap_or(f64::NEG_INFINITY),
        test_return: test_outcome.metrics.return_pct,
        test_pf: test_outcome.metrics.pf,
        test_sharpe: test_outcome.metrics.sharpe,
        test_maxdd: test_outcome.metrics.maxdd,
        test_trades: test_outcome.metrics.trades,
        test_win_rate: test_win_rate(&test_outcome.closed_pnls),
        start_balance: start_balance.to_f64().unwrap_or(0.0),
        end_balance: end_balance.to_f64().unwrap_or(0.0),
        optimal_params: best.params,
        elapsed_secs: 0.0,
    }
}

fn summarize(initial_balance: Decimal, final_balance: Decimal, results: &[WindowResult]) -> RunSummary {
    let total_return_pct = if initial_balance > Decimal::ZERO {
        ((final_balance - initial_balance) / initial_balance)
            .to_f64()
            .unwrap_or(0.0)
    } else {
        0.0
    };

    if results.is_empty() {
        return RunSummary {
            initial_balance: initial_balance.to_f64().unwrap_or(0.0),
            final_balance: final_balance.to_f64().unwrap_or(0.0),
            total_return_pct,
            avg_test_pf: 0.0,
            median_test_pf: 0.0,
            pass_rate: 0.0,
            std_log_pf: 0.0,
            failing_windows: 0,
        };
    }

    let mut pfs: Vec<f64> = results.iter().map(|w| w.test_pf).collect();
    let avg_test_pf = pfs.iter().sum::<f64>() / pfs.len() as f64;

    pfs.sort_by(|a, b| a.total_cmp(b));
    let median_test_pf = if pfs.len() % 2 == 0 {
        (pfs[pfs.len() / 2 - 1] + pfs[pfs.len() / 2]) / 2.0
    } else {
        pfs[pfs.len() / 2]
    };

    let pass_rate = results.iter().filter(|w| w.test_pf > 1.1).count() as f64 / results.len() as f64;
    let failing_windows = results.iter().filter(|w| w.test_pf < 1.0).count();

    let log_pfs: Vec<f64> = results.iter().map(|w| w.test_pf.max(0.01).ln()).collect();
    let mean_log_pf = log_pfs.iter().sum::<f64>() / log_pfs.len() as f64;
    let std_log_pf = if log_pfs.len() > 1 {
        let variance = log_pfs.iter().map(|v| (v - mean_log_pf).powi(2)).sum::<f64>()
            / (log_pfs.len() - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    RunSummary {
        initial_balance: initial_balance.to_f64().unwrap_or(0.0),
        final_balance: final_balance.to_f64().unwrap_or(0.0),
        total_return_pct,
        avg_test_pf,
        median_test_pf,
        pass_rate,
        std_log_pf,
        failing_windows,
    }
}
