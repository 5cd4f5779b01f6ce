use super::candle::Candle;
use super::indicators;
use super::series::MarketSeries;
use super::timeframe::Timeframe;
use std::cell::RefCell;

/// EMA-20 vs EMA-50 relationship on H4, used by the regime classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmaAlignment {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Default)]
struct IndicatorCache {
    rsi: Option<Vec<f64>>,
    atr: Option<Vec<f64>>,
    adx: Option<f64>,
    atr_avg_14: Option<f64>,
    ema_alignment: Option<EmaAlignment>,
}

/// Aggregates one series per timeframe plus a lazily-memoized indicator
/// cache. `update` always returns a brand new `MarketState`; the cache never
/// survives across states, so a stale read is structurally impossible.
#[derive(Debug, Clone)]
pub struct MarketState {
    pub symbol: String,
    pub m5: MarketSeries,
    pub m15: MarketSeries,
    pub h1: MarketSeries,
    pub h4: MarketSeries,
    cache: RefCell<IndicatorCache>,
}

impl MarketState {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            m5: MarketSeries::new(),
            m15: MarketSeries::new(),
            h1: MarketSeries::new(),
            h4: MarketSeries::new(),
            cache: RefCell::new(IndicatorCache::default()),
        }
    }

    /// Returns a new state with `candle` routed into the series matching its
    /// timeframe; every other series is shared unchanged (cheap clone, the
    /// underlying storage is `Arc`-backed).
    pub fn update(&self, candle: Candle) -> Self {
        let (m5, m15, h1, h4) = match candle.timeframe {
            Timeframe::M5 => (self.m5.add(candle), self.m15.clone(), self.h1.clone(), self.h4.clone()),
            Timeframe::M15 => (self.m5.clone(), self.m15.add(candle), self.h1.clone(), self.h4.clone()),
            Timeframe::H1 => (self.m5.clone(), self.m15.clone(), self.h1.add(candle), self.h4.clone()),
            Timeframe::H4 => (self.m5.clone(), self.m15.clone(), self.h1.clone(), self.h4.add(candle)),
        };
        Self {
            symbol: self.symbol.clone(),
            m5,
            m15,
            h1,
            h4,
            cache: RefCell::new(IndicatorCache::default()),
        }
    }

    pub fn get_series(&self, timeframe: Timeframe) -> &MarketSeries {
        match timeframe {
            Timeframe::M5 => &self.m5,
            Timeframe::M15 => &self.m15,
            Timeframe::H1 => &self.h1,
            Timeframe::H4 => &self.h4,
        }
    }

    /// RSI-14 vector aligned with H4, memoized on first read.
    pub fn rsi(&self) -> Vec<f64> {
        if self.cache.borrow().rsi.is_none() {
            let computed = indicators::rsi_series(self.h4.as_slice(), 14);
            self.cache.borrow_mut().rsi = Some(computed);
        }
        self.cache.borrow().rsi.clone().unwrap_or_default()
    }

    /// ATR-14 vector aligned with H4, memoized on first read.
    pub fn atr(&self) -> Vec<f64> {
        if self.cache.borrow().atr.is_none() {
            let computed = indicators::atr_series(self.h4.as_slice(), 14);
            self.cache.borrow_mut().atr = Some(computed);
        }
        self.cache.borrow().atr.clone().unwrap_or_default()
    }

    /// Current ADX-14 scalar on H4, memoized on first read.
    pub fn adx(&self) -> f64 {
        if let Some(v) = self.cache.borrow().adx {
            return v;
        }
        let v = indicators::current_adx(self.h4.as_slice(), 14);
        self.cache.borrow_mut().adx = Some(v);
        v
    }

    /// Mean of the last 14 ATR values, memoized on first read.
    pub fn atr_avg_14(&self) -> f64 {
        if let Some(v) = self.cache.borrow().atr_avg_14 {
            return v;
        }
        let atr = self.atr();
        let v = if atr.len() >= 14 {
            atr[atr.len() - 14..].iter().sum::<f64>() / 14.0
        } else if !atr.is_empty() {
            atr.iter().sum::<f64>() / atr.len() as f64
        } else {
            indicators::NEUTRAL_ATR
        };
        self.cache.borrow_mut().atr_avg_14 = Some(v);
        v
    }

    /// EMA-20 vs EMA-50 alignment on H4, memoized on first read.
    pub fn ema_alignment(&self) -> EmaAlignment {
        if let Some(v) = self.cache.borrow().ema_alignment {
            return v;
        }
        let ema20 = indicators::current_ema(self.h4.as_slice(), 20);
        let ema50 = indicators::current_ema(self.h4.as_slice(), 50);
        let v = match (ema20, ema50) {
            (Some(a), Some(b)) if a > b => EmaAlignment::Bullish,
            (Some(a), Some(b)) if a < b => EmaAlignment::Bearish,
            _ => EmaAlignment::Neutral,
        };
        self.cache.borrow_mut().ema_alignment = Some(v);
        v
    }

    /// Current H4 close, or the neutral-volatility fallback ATR ratio when
    /// the ATR series can't be read (e.g. empty series).
    pub fn current_atr(&self) -> f64 {
        self.atr().last().copied().unwrap_or(indicators::NEUTRAL_ATR)
    }

    pub fn current_rsi(&self) -> f64 {
        self.rsi().last().copied().unwrap_or(indicators::NEUTRAL_RSI)
    }
}
