//! Rolling train/test window generation and warmup slicing.

use super::candle::Candle;
use super::errors::NoWindows;
use chrono::{TimeZone, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct WindowConfig {
    pub year: i32,
    pub train_months: u32,
    pub test_months: u32,
    pub step_months: u32,
    pub warmup_bars: usize,
}

#[derive(Debug, Clone)]
pub struct Window {
    pub id: usize,
    pub label: String,
    pub train_start_month: u32,
    pub train_end_month: u32,
    pub test_start_month: u32,
    pub test_end_month: u32,
    pub train_data: Vec<Candle>,
    pub test_data: Vec<Candle>,
    pub warmup_data: Vec<Candle>,
}

fn month_bounds_ms(year: i32, month: u32) -> (i64, i64) {
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("valid calendar month start");
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let next_start = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .expect("valid calendar month start");
    let end = next_start - chrono::Duration::milliseconds(1);
    (start.timestamp_millis(), end.timestamp_millis())
}

fn slice_by_months(candles: &[Candle], year: i32, start_month: u32, end_month: u32) -> Vec<Candle> {
    let (start_ms, _) = month_bounds_ms(year, start_month);
    let (_, end_ms) = month_bounds_ms(year, end_month);
    candles
        .iter()
        .filter(|c| c.timestamp_ms >= start_ms && c.timestamp_ms <= end_ms)
        .copied()
        .collect()
}

fn warmup_slice(candles: &[Candle], reference_ts: i64, warmup_bars: usize) -> Vec<Candle> {
    let eligible: Vec<Candle> = candles
        .iter()
        .filter(|c| c.timestamp_ms < reference_ts)
        .copied()
        .collect();
    if eligible.len() <= warmup_bars {
        eligible
    } else {
        eligible[eligible.len() - warmup_bars..].to_vec()
    }
}

fn fmt_month(year: i32, month: u32) -> String {
    format!("{year}-{month:02}")
}

/// Generates rolling windows for `config.year`.
///
/// Preconditions: `step_months == test_months`. Number of windows is
/// `12 - train_months - test_months + 1`.
pub fn generate_windows(
    candles: &[Candle],
    config: &WindowConfig,
) -> Result<Vec<Window>, NoWindows> {
    if config.step_months != config.test_months {
        return Err(NoWindows::StepMismatch {
            step_months: config.step_months,
            test_months: config.test_months,
        });
    }

    let total = config.train_months + config.test_months;
    if total > 12 {
        return Err(NoWindows::InsufficientMonths {
            year: config.year,
            train_months: config.train_months,
            test_months: config.test_months,
        });
    }
    let num_windows = (12 - total + 1) as usize;

    let mut windows = Vec::with_capacity(num_windows);
    for i in 0..num_windows {
        let train_start_month = 1 + (i as u32) * config.step_months;
        let train_end_month = train_start_month + config.train_months - 1;
        let test_start_month = train_end_month + 1;
        let test_end_month = test_start_month + config.test_months - 1;

        let train_data = slice_by_months(candles, config.year, train_start_month, train_end_month);
        let test_data = slice_by_months(candles, config.year, test_start_month, test_end_month);

        let warmup_data = match train_data.first() {
            Some(first) => warmup_slice(candles, first.timestamp_ms, config.warmup_bars),
            None => Vec::new(),
        };

        let label = format!(
            "Train:{}to{}_Test:{}",
            fmt_month(config.year, train_start_month),
            fmt_month(config.year, train_end_month),
            fmt_month(config.year, test_start_month),
        );

        windows.push(Window {
            id: i,
            label,
            train_start_month,
            train_end_month,
            test_start_month,
            test_end_month,
            train_data,
            test_data,
            warmup_data,
        });
    }

    Ok(windows)
}

/// Splits a window's train data into SubTrain (first `train_months - 1`
/// months) and ValTrain (the last train month) by index, per the spec's
/// `split_idx = len(train) * (train_months - 1) / train_months`.
pub fn split_train(train_data: &[Candle], train_months: u32) -> (&[Candle], &[Candle]) {
    if train_months == 0 {
        return (train_data, &[]);
    }
    let split_idx = train_data.len() * (train_months as usize - 1) / train_months as usize;
    train_data.split_at(split_idx)
}
