use super::{clip, Alpha};
use crate::domain::wfo::market_state::MarketState;

/// Normalizes current RSI-14 to `(rsi - 50) / 50`.
#[derive(Debug, Default)]
pub struct MomentumAlpha;

impl Alpha for MomentumAlpha {
    fn get_score(&self, state: &MarketState) -> f64 {
        let rsi = state.current_rsi();
        clip((rsi - 50.0) / 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_state_scores_zero() {
        let state = MarketState::empty("TEST");
        assert_eq!(MomentumAlpha.get_score(&state), 0.0);
    }

    #[test]
    fn test_score_is_bounded() {
        let state = MarketState::empty("TEST");
        let score = MomentumAlpha.get_score(&state);
        assert!((-1.0..=1.0).contains(&score));
    }
}
