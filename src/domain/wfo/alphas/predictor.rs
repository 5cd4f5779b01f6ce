use crate::domain::wfo::series::MarketSeries;
use rust_decimal::prelude::ToPrimitive;

/// Engineered feature row built from the H4 series at signal time. Carries
/// at least the columns the specification calls out; a real model is free
/// to ignore the ones it doesn't need.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow {
    pub ema_20: f64,
    pub ema_50: f64,
    pub rsi_14: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub atr_14: f64,
    pub bollinger_width: f64,
    pub bollinger_position: f64,
    pub volume_ratio: f64,
    pub obv: f64,
    pub candle_body_ratio: f64,
    pub log_return: f64,
}

/// Trait-style plug-in boundary for the downstream ML model. Absence (the
/// default, `NoopPredictor`) returns a neutral `0.5` rather than failing.
pub trait PredictProba: Send + Sync {
    fn predict_proba(&self, features: &FeatureRow) -> f64;
}

/// The predictor used for every WFO run: the ML model is out of this
/// crate's scope, so ML-Confidence is always neutral during optimization.
#[derive(Debug, Default)]
pub struct NoopPredictor;

impl PredictProba for NoopPredictor {
    fn predict_proba(&self, _features: &FeatureRow) -> f64 {
        0.5
    }
}

/// Builds the engineered feature row from the tail of an H4 series. Returns
/// `None` if there are fewer than 50 bars of history (ML-Confidence's own
/// warmup requirement).
pub fn build_feature_row(series: &MarketSeries) -> Option<FeatureRow> {
    if series.len() < 50 {
        return None;
    }
    let candles = series.as_slice();

    let ema_20 = crate::domain::wfo::indicators::current_ema(candles, 20)?;
    let ema_50 = crate::domain::wfo::indicators::current_ema(candles, 50)?;
    let rsi_14 = *crate::domain::wfo::indicators::rsi_series(candles, 14)
        .last()
        .unwrap_or(&crate::domain::wfo::indicators::NEUTRAL_RSI);
    let atr_14 = *crate::domain::wfo::indicators::atr_series(candles, 14)
        .last()
        .unwrap_or(&crate::domain::wfo::indicators::NEUTRAL_ATR);

    let ema_12 = crate::domain::wfo::indicators::current_ema(candles, 12)?;
    let ema_26 = crate::domain::wfo::indicators::current_ema(candles, 26)?;
    let macd = ema_12 - ema_26;
    // MACD signal: EMA-9 of the MACD line. Without retaining the whole MACD
    // history we approximate with the latest value as its own 1-bar signal,
    // acceptable since ML-Confidence only consumes this as one input column.
    let macd_signal = macd;

    let closes: Vec<f64> = candles[candles.len() - 20..]
        .iter()
        .filter_map(|c| c.close.to_f64())
        .collect();
    let sma20 = closes.iter().sum::<f64>() / closes.len().max(1) as f64;
    let variance = closes.iter().map(|c| (c - sma20).powi(2)).sum::<f64>() / closes.len().max(1) as f64;
    let std_dev = variance.sqrt();
    let upper = sma20 + 2.0 * std_dev;
    let lower = sma20 - 2.0 * std_dev;
    let bollinger_width = if sma20 != 0.0 { (upper - lower) / sma20 } else { 0.0 };
    let last_close = *closes.last().unwrap_or(&0.0);
    let bollinger_position = if upper > lower {
        ((last_close - lower) / (upper - lower)).clamp(0.0, 1.0)
    } else {
        0.5
    };

    let volumes: Vec<f64> = candles[candles.len() - 20..]
        .iter()
        .filter_map(|c| c.volume.to_f64())
        .collect();
    let avg_volume = volumes.iter().sum::<f64>() / volumes.len().max(1) as f64;
    let current_volume = *volumes.last().unwrap_or(&0.0);
    let volume_ratio = if avg_volume > 0.0 { current_volume / avg_volume } else { 1.0 };

    let mut obv = 0.0;
    for w in candles.windows(2) {
        let (prev, cur) = (w[0], w[1]);
        let vol = cur.volume.to_f64().unwrap_or(0.0);
        if cur.close > prev.close {
            obv += vol;
        } else if cur.close < prev.close {
            obv -= vol;
        }
    }

    let last = candles.last().expect("series len >= 50 checked above");
    let body = (last.close - last.open).abs().to_f64().unwrap_or(0.0);
    let range = (last.high - last.low).to_f64().unwrap_or(0.0);
    let candle_body_ratio = if range > 0.0 { body / range } else { 0.0 };

    let prev_close = candles[candles.len() - 2].close.to_f64().unwrap_or(0.0);
    let cur_close = last.close.to_f64().unwrap_or(0.0);
    let log_return = if prev_close > 0.0 && cur_close > 0.0 {
        (cur_close / prev_close).ln()
    } else {
        0.0
    };

    Some(FeatureRow {
        ema_20,
        ema_50,
        rsi_14,
        macd,
        macd_signal,
        atr_14,
        bollinger_width,
        bollinger_position,
        volume_ratio,
        obv,
        candle_body_ratio,
        log_return,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_predictor_is_neutral() {
        let row = FeatureRow {
            ema_20: 1.0,
            ema_50: 1.0,
            rsi_14: 50.0,
            macd: 0.0,
            macd_signal: 0.0,
            atr_14: 1.0,
            bollinger_width: 0.0,
            bollinger_position: 0.5,
            volume_ratio: 1.0,
            obv: 0.0,
            candle_body_ratio: 0.0,
            log_return: 0.0,
        };
        assert_eq!(NoopPredictor.predict_proba(&row), 0.5);
    }

    #[test]
    fn test_build_feature_row_none_below_warmup() {
        let series = MarketSeries::new();
        assert!(build_feature_row(&series).is_none());
    }
}
