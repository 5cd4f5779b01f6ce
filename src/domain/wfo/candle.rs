use super::errors::ConstructionError;
use super::timeframe::Timeframe;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single immutable OHLCV bar.
///
/// Construction enforces the invariants a downstream consumer relies on:
/// the wick fully contains the body and volume is non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub timeframe: Timeframe,
    pub complete: bool,
}

impl Candle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp_ms: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        timeframe: Timeframe,
        complete: bool,
    ) -> Result<Self, ConstructionError> {
        let body_high = open.max(close);
        let body_low = open.min(close);

        if high < body_high.max(low) {
            return Err(ConstructionError::HighBelowBody {
                high,
                open,
                close,
                low,
            });
        }
        if low > body_low.min(high) {
            return Err(ConstructionError::LowAboveBody {
                low,
                open,
                close,
                high,
            });
        }
        if volume < Decimal::ZERO {
            return Err(ConstructionError::NegativeVolume { volume });
        }

        Ok(Self {
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
            timeframe,
            complete,
        })
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn body_size(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    pub fn true_range(&self, prev_close: Decimal) -> Decimal {
        (self.high - self.low)
            .max((self.high - prev_close).abs())
            .max((self.low - prev_close).abs())
    }
}
