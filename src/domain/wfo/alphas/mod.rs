pub mod combiner;
pub mod liquidity;
pub mod ml_confidence;
pub mod momentum;
pub mod ob_quality;
pub mod predictor;
pub mod volatility;

pub use combiner::AlphaCombiner;
pub use predictor::{FeatureRow, NoopPredictor, PredictProba};

use crate::domain::wfo::market_state::MarketState;

/// Maps `MarketState` to a score in `[-1, 1]`. Every implementation clips its
/// own output; callers never need to re-clip.
pub trait Alpha {
    fn get_score(&self, state: &MarketState) -> f64;
}

pub(crate) fn clip(score: f64) -> f64 {
    score.clamp(-1.0, 1.0)
}
