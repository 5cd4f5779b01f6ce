//! Walk-forward optimization domain: candles, market state, indicators,
//! regime classification, alphas, parameter space, metrics/fitness, the
//! genetic algorithm, and the rolling window generator.

pub mod alphas;
pub mod candle;
pub mod errors;
pub mod fitness;
pub mod ga;
pub mod indicators;
pub mod market_state;
pub mod metrics;
pub mod param_space;
pub mod position;
pub mod regime;
pub mod series;
pub mod signal;
pub mod structure;
pub mod timeframe;
pub mod windows;
