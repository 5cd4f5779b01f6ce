use super::{clip, Alpha};
use crate::domain::wfo::market_state::MarketState;

const PERIOD: usize = 14;

/// `(current_atr / mean(atr_last_14)) - 1`, clipped.
#[derive(Debug, Default)]
pub struct VolatilityAlpha;

impl Alpha for VolatilityAlpha {
    fn get_score(&self, state: &MarketState) -> f64 {
        let atr = state.atr();
        if atr.len() < PERIOD + 1 {
            return 0.0;
        }
        let current = *atr.last().expect("checked len >= PERIOD + 1");
        let window = &atr[atr.len() - PERIOD..];
        let avg = window.iter().sum::<f64>() / PERIOD as f64;
        if avg == 0.0 {
            return 0.0;
        }
        clip((current / avg) - 1.0)
    }
}
