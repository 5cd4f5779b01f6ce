use super::{clip, Alpha};
use crate::domain::wfo::market_state::MarketState;
use rust_decimal::prelude::ToPrimitive;

const PERIOD: usize = 20;

/// `(current_volume / mean(volume_last_20)) - 1`, clipped.
#[derive(Debug, Default)]
pub struct LiquidityAlpha;

impl Alpha for LiquidityAlpha {
    fn get_score(&self, state: &MarketState) -> f64 {
        let series = &state.h4;
        if series.len() < PERIOD + 1 {
            return 0.0;
        }
        let volumes: Vec<f64> = (series.len() - PERIOD..series.len())
            .filter_map(|i| series.get(i).and_then(|c| c.volume.to_f64()))
            .collect();
        if volumes.len() < PERIOD {
            return 0.0;
        }
        let current = *volumes.last().expect("checked len >= PERIOD");
        let avg = volumes[..volumes.len() - 1].iter().sum::<f64>() / (volumes.len() - 1) as f64;
        if avg == 0.0 {
            return 0.0;
        }
        clip((current / avg) - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_history_scores_zero() {
        let state = MarketState::empty("TEST");
        assert_eq!(LiquidityAlpha.get_score(&state), 0.0);
    }
}
