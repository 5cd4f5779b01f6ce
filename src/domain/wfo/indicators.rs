//! Indicator math over a candle slice.
//!
//! Built on the `ta` crate the same way the rest of the codebase leans on
//! library-standard implementations rather than hand-rolled smoothing: each
//! function constructs a fresh stateful indicator and feeds it bar-by-bar,
//! discarding the indicator once the vector/scalar is produced.

use super::candle::Candle;
use ta::indicators::{
    AverageDirectionalIndex, AverageTrueRange, ExponentialMovingAverage, RelativeStrengthIndex,
};
use ta::{DataItem, Next};

/// Neutral RSI returned when history is too short to warm up the indicator.
pub const NEUTRAL_RSI: f64 = 50.0;
/// Neutral ATR returned when history is too short to warm up the indicator.
pub const NEUTRAL_ATR: f64 = 1.0;
/// Neutral ADX returned when history is too short to warm up the indicator.
pub const NEUTRAL_ADX: f64 = 20.0;

fn to_data_item(c: &Candle) -> Option<DataItem> {
    DataItem::builder()
        .open(c.open.try_into().ok()?)
        .high(c.high.try_into().ok()?)
        .low(c.low.try_into().ok()?)
        .close(c.close.try_into().ok()?)
        .volume(c.volume.try_into().ok()?)
        .build()
        .ok()
}

/// RSI-14 over every bar of `candles`, aligned 1:1 with the input.
/// Returns the neutral constant for every position while history is below
/// the indicator's warmup requirement (it still returns one value per bar;
/// `ta`'s RSI is well-defined from the very first price, so "neutral" here
/// only applies to the wholly-empty case).
pub fn rsi_series(candles: &[Candle], period: usize) -> Vec<f64> {
    if candles.is_empty() {
        return Vec::new();
    }
    let mut rsi = match RelativeStrengthIndex::new(period) {
        Ok(r) => r,
        Err(_) => return vec![NEUTRAL_RSI; candles.len()],
    };
    candles
        .iter()
        .map(|c| match c.close.try_into() {
            Ok(close) => rsi.next(close),
            Err(_) => NEUTRAL_RSI,
        })
        .collect()
}

/// ATR-14 over every bar of `candles`, aligned 1:1 with the input.
pub fn atr_series(candles: &[Candle], period: usize) -> Vec<f64> {
    if candles.is_empty() {
        return Vec::new();
    }
    let mut atr = match AverageTrueRange::new(period) {
        Ok(a) => a,
        Err(_) => return vec![NEUTRAL_ATR; candles.len()],
    };
    candles
        .iter()
        .map(|c| match to_data_item(c) {
            Some(item) => atr.next(&item),
            None => NEUTRAL_ATR,
        })
        .collect()
}

/// Current ADX-14 scalar, folding the whole slice to warm up the smoothing.
pub fn current_adx(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < period + 1 {
        return NEUTRAL_ADX;
    }
    let mut adx = match AverageDirectionalIndex::new(period) {
        Ok(a) => a,
        Err(_) => return NEUTRAL_ADX,
    };
    let mut last = NEUTRAL_ADX;
    for c in candles {
        if let Some(item) = to_data_item(c) {
            last = adx.next(&item);
        }
    }
    last
}

/// Current EMA(period) close, folding the whole slice to warm up the average.
pub fn current_ema(candles: &[Candle], period: usize) -> Option<f64> {
    if candles.is_empty() {
        return None;
    }
    let mut ema = ExponentialMovingAverage::new(period).ok()?;
    let mut last = None;
    for c in candles {
        if let Ok(close) = c.close.try_into() {
            last = Some(ema.next(close));
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wfo::timeframe::Timeframe;
    use rust_decimal_macros::dec;

    fn mk_candles(closes: &[i64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let close = rust_decimal::Decimal::from(close);
                Candle::new(
                    i as i64,
                    close,
                    close + dec!(1),
                    close - dec!(1),
                    close,
                    dec!(100),
                    Timeframe::H4,
                    true,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_rsi_series_length_matches_input() {
        let candles = mk_candles(&[100, 101, 102, 101, 103, 104, 105]);
        let rsi = rsi_series(&candles, 14);
        assert_eq!(rsi.len(), candles.len());
    }

    #[test]
    fn test_rsi_trending_up_above_fifty() {
        let closes: Vec<i64> = (0..30).map(|i| 100 + i).collect();
        let candles = mk_candles(&closes);
        let rsi = rsi_series(&candles, 14);
        assert!(*rsi.last().unwrap() > 50.0);
    }

    #[test]
    fn test_empty_series_returns_empty_vector() {
        assert!(rsi_series(&[], 14).is_empty());
        assert!(atr_series(&[], 14).is_empty());
    }

    #[test]
    fn test_current_adx_neutral_when_too_short() {
        let candles = mk_candles(&[100, 101, 102]);
        assert_eq!(current_adx(&candles, 14), NEUTRAL_ADX);
    }
}
