use super::candle::Candle;
use std::sync::Arc;

/// Append-only ordered sequence of candles, sorted ascending by timestamp.
///
/// `add` never mutates the receiver: it hands back a new series sharing the
/// existing backing storage via `Arc`, so callers can keep cheap handles to
/// past states without a deep copy per bar.
#[derive(Debug, Clone, Default)]
pub struct MarketSeries {
    candles: Arc<Vec<Candle>>,
}

impl MarketSeries {
    pub fn new() -> Self {
        Self {
            candles: Arc::new(Vec::new()),
        }
    }

    pub fn from_vec(candles: Vec<Candle>) -> Self {
        Self {
            candles: Arc::new(candles),
        }
    }

    /// Returns a new series with `candle` appended. Assumes `candle.timestamp_ms`
    /// is `>=` the series' last timestamp; the caller (MarketState/backtest loop)
    /// is responsible for feeding bars in order.
    pub fn add(&self, candle: Candle) -> Self {
        let mut next = (*self.candles).clone();
        next.push(candle);
        Self {
            candles: Arc::new(next),
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// The most recent candle, regardless of its `complete` flag.
    pub fn current(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The most recent fully-closed candle.
    pub fn last_closed(&self) -> Option<&Candle> {
        self.candles.iter().rev().find(|c| c.complete)
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Timestamps are strictly non-decreasing across the whole series.
    pub fn is_sorted(&self) -> bool {
        self.candles.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wfo::timeframe::Timeframe;
    use rust_decimal_macros::dec;

    fn candle(ts: i64) -> Candle {
        Candle::new(
            ts,
            dec!(100),
            dec!(105),
            dec!(95),
            dec!(102),
            dec!(10),
            Timeframe::H4,
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_add_does_not_mutate_original() {
        let s0 = MarketSeries::new();
        let s1 = s0.add(candle(1));
        assert_eq!(s0.len(), 0);
        assert_eq!(s1.len(), 1);
    }

    #[test]
    fn test_current_and_last_closed() {
        let s = MarketSeries::new().add(candle(1)).add(candle(2));
        assert_eq!(s.current().unwrap().timestamp_ms, 2);
        assert_eq!(s.last_closed().unwrap().timestamp_ms, 2);
    }

    #[test]
    fn test_empty_series_has_no_current() {
        let s = MarketSeries::new();
        assert!(s.current().is_none());
        assert!(s.is_empty());
    }

    #[test]
    fn test_is_sorted() {
        let s = MarketSeries::new().add(candle(1)).add(candle(2)).add(candle(2));
        assert!(s.is_sorted());
    }
}
