use super::market_state::{EmaAlignment, MarketState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse market-state label used to switch strategy weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    TrendingBullish,
    TrendingBearish,
    SidewaysRange,
    HighVolatility,
    BreakoutPending,
    /// Reserved fallback slot for the orchestrator; the classifier never emits it.
    NewsDriven,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Regime::TrendingBullish => "TrendingBullish",
            Regime::TrendingBearish => "TrendingBearish",
            Regime::SidewaysRange => "SidewaysRange",
            Regime::HighVolatility => "HighVolatility",
            Regime::BreakoutPending => "BreakoutPending",
            Regime::NewsDriven => "NewsDriven",
        };
        write!(f, "{s}")
    }
}

/// Threshold overrides; defaults match `ParamSpace`'s default vector.
#[derive(Debug, Clone, Copy)]
pub struct RegimeThresholds {
    pub adx_trend_threshold: f64,
    pub adx_sideways_threshold: f64,
    pub atr_high_mult: f64,
    pub atr_low_mult: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            adx_trend_threshold: 25.0,
            adx_sideways_threshold: 15.0,
            atr_high_mult: 1.50,
            atr_low_mult: 0.65,
        }
    }
}

/// Resolution order (first match wins), per the classifier's specification.
pub fn classify_regime(state: &MarketState, thresholds: RegimeThresholds) -> Regime {
    let current_atr = state.current_atr();
    let atr_avg_14 = state.atr_avg_14();
    let adx = state.adx();
    let ema_alignment = state.ema_alignment();

    if current_atr > atr_avg_14 * thresholds.atr_high_mult {
        return Regime::HighVolatility;
    }

    if adx > thresholds.adx_trend_threshold {
        match ema_alignment {
            EmaAlignment::Bullish => return Regime::TrendingBullish,
            EmaAlignment::Bearish => return Regime::TrendingBearish,
            EmaAlignment::Neutral => {}
        }
    }

    if current_atr < atr_avg_14 * thresholds.atr_low_mult && adx < thresholds.adx_trend_threshold {
        return Regime::BreakoutPending;
    }

    if adx < thresholds.adx_sideways_threshold {
        return Regime::SidewaysRange;
    }

    Regime::SidewaysRange
}
