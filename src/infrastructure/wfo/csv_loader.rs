//! Loads OHLCV candles from an exchange-archive-style CSV: one bar per
//! line, no header, fields by position.

use crate::domain::wfo::candle::Candle;
use crate::domain::wfo::errors::{ConstructionError, DataMissing};
use crate::domain::wfo::timeframe::Timeframe;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

/// `open_time_ms, open, high, low, close, volume, ...` — only the first six
/// positional fields are required; extra columns (close_time_ms,
/// quote_volume, n_trades, taker_buy_base, taker_buy_quote, ignore) are
/// tolerated but unused.
pub fn load_candles(path: impl AsRef<Path>, timeframe: Timeframe) -> Result<Vec<Candle>, DataMissing> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DataMissing::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|_| DataMissing::FileNotFound {
            path: path.display().to_string(),
        })?;

    let mut candles = Vec::new();
    for (line_no, record) in reader.records().enumerate() {
        let Ok(record) = record else { continue };
        if record.len() < 6 {
            continue;
        }

        let parsed = parse_row(&record, timeframe)
            .map_err(|e| ConstructionError::AtLine {
                line: line_no + 1,
                source: Box::new(e),
            });

        match parsed {
            Ok(candle) => candles.push(candle),
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "skipping malformed candle row");
                continue;
            }
        }
    }

    if candles.is_empty() {
        return Err(DataMissing::Empty {
            path: path.display().to_string(),
        });
    }

    Ok(candles)
}

fn parse_row(record: &csv::StringRecord, timeframe: Timeframe) -> Result<Candle, ConstructionError> {
    let timestamp_ms: i64 = record.get(0).and_then(|s| s.parse().ok()).unwrap_or(0);
    let open = decimal_field(record, 1);
    let high = decimal_field(record, 2);
    let low = decimal_field(record, 3);
    let close = decimal_field(record, 4);
    let volume = decimal_field(record, 5);

    Candle::new(timestamp_ms, open, high, low, close, volume, timeframe, true)
}

fn decimal_field(record: &csv::StringRecord, index: usize) -> Decimal {
    record
        .get(index)
        .and_then(|s| Decimal::from_str(s).ok())
        .unwrap_or(Decimal::ZERO)
}
