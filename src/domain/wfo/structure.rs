//! TJR-convention structural scanners: fractal validity, break-of-structure,
//! liquidity sweeps, and the order block they imply.

use super::series::MarketSeries;
use rust_decimal::Decimal;

const SCAN_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OBType {
    Bullish,
    Bearish,
}

/// An order block candidate: the candle preceding a sweep-and-BOS move.
#[derive(Debug, Clone, Copy)]
pub struct OrderBlock {
    pub ob_type: OBType,
    pub top: Decimal,
    pub bottom: Decimal,
    pub index: usize,
}

/// A valid swing high is a green bar immediately followed by a red bar.
pub fn is_valid_high(series: &MarketSeries, index: usize) -> bool {
    let (Some(c), Some(next)) = (series.get(index), series.get(index + 1)) else {
        return false;
    };
    c.is_bullish() && next.is_bearish()
}

/// A valid swing low is a red bar immediately followed by a green bar.
pub fn is_valid_low(series: &MarketSeries, index: usize) -> bool {
    let (Some(c), Some(next)) = (series.get(index), series.get(index + 1)) else {
        return false;
    };
    c.is_bearish() && next.is_bullish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureType {
    BosBullish,
    BosBearish,
}

#[derive(Debug, Clone, Copy)]
pub struct StructureEvent {
    pub structure_type: StructureType,
    pub swing_index: usize,
}

/// BOS requires a later bar's *close* (not wick) to trade beyond a recent
/// valid swing extreme. Scans back up to `SCAN_WINDOW` bars from `index`.
pub fn detect_bos(series: &MarketSeries, index: usize) -> Option<StructureEvent> {
    let scan_stop = index.saturating_sub(SCAN_WINDOW);
    let current = series.get(index)?;

    for swing_idx in (scan_stop..index).rev() {
        if is_valid_high(series, swing_idx) {
            let swing_high = series.get(swing_idx)?.high;
            if current.close > swing_high {
                return Some(StructureEvent {
                    structure_type: StructureType::BosBullish,
                    swing_index: swing_idx,
                });
            }
        }
        if is_valid_low(series, swing_idx) {
            let swing_low = series.get(swing_idx)?.low;
            if current.close < swing_low {
                return Some(StructureEvent {
                    structure_type: StructureType::BosBearish,
                    swing_index: swing_idx,
                });
            }
        }
    }
    None
}

/// TJR order block detection:
/// 1. Confirm BOS at `index`.
/// 2. Trace back to find the extreme of the move that produced the BOS.
/// 3. Require that extreme to have swept (wicked through without closing
///    beyond) an earlier valid swing of the same polarity.
/// 4. The OB candle is the last opposite-colored candle before the move.
pub fn detect_ob(series: &MarketSeries, index: usize) -> Option<OrderBlock> {
    let bos = detect_bos(series, index)?;
    let scan_stop = index.saturating_sub(SCAN_WINDOW);

    match bos.structure_type {
        StructureType::BosBullish => {
            let mut lowest_idx = None;
            let mut lowest_val = Decimal::MAX;
            for i in (scan_stop..=index).rev() {
                let c = series.get(i)?;
                if c.low < lowest_val {
                    lowest_val = c.low;
                    lowest_idx = Some(i);
                }
            }
            let lowest_idx = lowest_idx?;

            let swept = (scan_stop..lowest_idx).rev().any(|k| {
                is_valid_low(series, k)
                    && series
                        .get(k)
                        .map(|c| c.low > lowest_val)
                        .unwrap_or(false)
            });
            if !swept {
                return None;
            }

            let mut ob_idx = lowest_idx;
            let mut ob_candle = *series.get(ob_idx)?;
            if ob_candle.is_bullish() && ob_idx > 0 {
                if let Some(prev) = series.get(ob_idx - 1) {
                    if prev.is_bearish() {
                        ob_idx -= 1;
                        ob_candle = *prev;
                    }
                }
            }

            Some(OrderBlock {
                ob_type: OBType::Bullish,
                top: ob_candle.high,
                bottom: ob_candle.low,
                index: ob_idx,
            })
        }
        StructureType::BosBearish => {
            let mut highest_idx = None;
            let mut highest_val = Decimal::MIN;
            for i in (scan_stop..=index).rev() {
                let c = series.get(i)?;
                if c.high > highest_val {
                    highest_val = c.high;
                    highest_idx = Some(i);
                }
            }
            let highest_idx = highest_idx?;

            let swept = (scan_stop..highest_idx).rev().any(|k| {
                is_valid_high(series, k)
                    && series
                        .get(k)
                        .map(|c| c.high < highest_val)
                        .unwrap_or(false)
            });
            if !swept {
                return None;
            }

            let mut ob_idx = highest_idx;
            let mut ob_candle = *series.get(ob_idx)?;
            if ob_candle.is_bearish() && ob_idx > 0 {
                if let Some(prev) = series.get(ob_idx - 1) {
                    if prev.is_bullish() {
                        ob_idx -= 1;
                        ob_candle = *prev;
                    }
                }
            }

            Some(OrderBlock {
                ob_type: OBType::Bearish,
                top: ob_candle.high,
                bottom: ob_candle.low,
                index: ob_idx,
            })
        }
    }
}
