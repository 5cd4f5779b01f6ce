use super::predictor::{build_feature_row, PredictProba};
use super::{clip, Alpha};
use crate::domain::wfo::market_state::MarketState;

/// Transforms the injected predictor's win probability `p` into a
/// directional score `(p - 0.5) * 2`. Returns `0` with fewer than 50 bars
/// of H4 history, or if the predictor is absent (callers pass `NoopPredictor`).
pub struct MlConfidenceAlpha<'a> {
    predictor: &'a dyn PredictProba,
}

impl<'a> MlConfidenceAlpha<'a> {
    pub fn new(predictor: &'a dyn PredictProba) -> Self {
        Self { predictor }
    }
}

impl Alpha for MlConfidenceAlpha<'_> {
    fn get_score(&self, state: &MarketState) -> f64 {
        match build_feature_row(&state.h4) {
            Some(row) => {
                let p = self.predictor.predict_proba(&row);
                clip((p - 0.5) * 2.0)
            }
            None => 0.0,
        }
    }
}
