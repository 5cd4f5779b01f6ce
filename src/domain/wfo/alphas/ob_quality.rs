use super::Alpha;
use crate::domain::wfo::market_state::MarketState;
use crate::domain::wfo::structure::{detect_ob, OBType};

/// Scans H4 for the most recent valid order block. `+1` bullish, `-1`
/// bearish, `0` if none. Quality multiplier is fixed at full strength;
/// grading sweep volume / BOS displacement is future scope.
#[derive(Debug, Default)]
pub struct ObQualityAlpha;

impl Alpha for ObQualityAlpha {
    fn get_score(&self, state: &MarketState) -> f64 {
        let series = &state.h4;
        if series.is_empty() {
            return 0.0;
        }
        let current_idx = series.len() - 1;
        match detect_ob(series, current_idx) {
            Some(ob) => match ob.ob_type {
                OBType::Bullish => 1.0,
                OBType::Bearish => -1.0,
            },
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_scores_zero() {
        let state = MarketState::empty("TEST");
        assert_eq!(ObQualityAlpha.get_score(&state), 0.0);
    }
}
