use super::Alpha;
use crate::domain::wfo::market_state::MarketState;
use crate::domain::wfo::signal::{Side, TradeSignal};
use std::collections::HashMap;

/// Weighted blend of independent alpha opinions (pure-alpha philosophy: each
/// alpha votes, the combiner averages, nothing is conditioned on another's
/// output).
pub struct AlphaCombiner<'a> {
    alphas: Vec<(&'a dyn Alpha, f64)>,
}

impl<'a> AlphaCombiner<'a> {
    pub fn new(alphas: Vec<(&'a dyn Alpha, f64)>) -> Self {
        Self { alphas }
    }

    /// `sum(score_i * w_i) / sum(w_i)`. `0` if there are no alphas or all
    /// weights are zero.
    pub fn aggregate_score(&self, state: &MarketState) -> f64 {
        if self.alphas.is_empty() {
            return 0.0;
        }
        let mut total_score = 0.0;
        let mut total_weight = 0.0;
        for (alpha, weight) in &self.alphas {
            total_score += alpha.get_score(state) * weight;
            total_weight += weight;
        }
        if total_weight == 0.0 {
            0.0
        } else {
            total_score / total_weight
        }
    }

    /// `None` if `|aggregate| < threshold`. Otherwise a `TradeSignal` with
    /// direction set and placeholder entry/SL/TP for the backtest engine to
    /// fill from the current bar and the risk-sizing rules.
    pub fn get_signal(
        &self,
        state: &MarketState,
        threshold: f64,
        symbol: &str,
        metadata: HashMap<String, String>,
    ) -> Option<TradeSignal> {
        let score = self.aggregate_score(state);
        if score.abs() < threshold {
            return None;
        }
        let side = if score > 0.0 { Side::Buy } else { Side::Sell };
        Some(TradeSignal {
            symbol: symbol.to_string(),
            side,
            entry_price: rust_decimal::Decimal::ZERO,
            stop_loss: rust_decimal::Decimal::ZERO,
            take_profit: rust_decimal::Decimal::ZERO,
            confidence: score.abs(),
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstAlpha(f64);
    impl Alpha for ConstAlpha {
        fn get_score(&self, _state: &MarketState) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_empty_combiner_is_neutral() {
        let combiner = AlphaCombiner::new(vec![]);
        let state = MarketState::empty("TEST");
        assert_eq!(combiner.aggregate_score(&state), 0.0);
    }

    #[test]
    fn test_weighted_average() {
        let a = ConstAlpha(1.0);
        let b = ConstAlpha(-1.0);
        let combiner = AlphaCombiner::new(vec![(&a as &dyn Alpha, 3.0), (&b as &dyn Alpha, 1.0)]);
        let state = MarketState::empty("TEST");
        let score = combiner.aggregate_score(&state);
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_weight_is_neutral() {
        let a = ConstAlpha(1.0);
        let combiner = AlphaCombiner::new(vec![(&a as &dyn Alpha, 0.0)]);
        let state = MarketState::empty("TEST");
        assert_eq!(combiner.aggregate_score(&state), 0.0);
    }

    #[test]
    fn test_signal_below_threshold_is_none() {
        let a = ConstAlpha(0.3);
        let combiner = AlphaCombiner::new(vec![(&a as &dyn Alpha, 1.0)]);
        let state = MarketState::empty("TEST");
        assert!(combiner
            .get_signal(&state, 0.6, "BTCUSDT", HashMap::new())
            .is_none());
    }

    #[test]
    fn test_signal_above_threshold_sets_side() {
        let a = ConstAlpha(0.8);
        let combiner = AlphaCombiner::new(vec![(&a as &dyn Alpha, 1.0)]);
        let state = MarketState::empty("TEST");
        let signal = combiner
            .get_signal(&state, 0.6, "BTCUSDT", HashMap::new())
            .unwrap();
        assert_eq!(signal.side, Side::Buy);
        assert!((signal.confidence - 0.8).abs() < 1e-9);
    }
}
