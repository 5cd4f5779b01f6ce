//! Dispatches a `MarketState` to a trade signal through one of two modes:
//! Parameterized (WFO, weights drawn from the GA's parameter vector) or
//! Switching (fixed per-regime agent profiles, used outside optimization).

use crate::domain::wfo::alphas::{
    liquidity::LiquidityAlpha, ml_confidence::MlConfidenceAlpha, momentum::MomentumAlpha,
    ob_quality::ObQualityAlpha, volatility::VolatilityAlpha, Alpha, AlphaCombiner, PredictProba,
};
use crate::domain::wfo::market_state::MarketState;
use crate::domain::wfo::param_space::ParamVec;
use crate::domain::wfo::regime::{classify_regime, Regime, RegimeThresholds};
use crate::domain::wfo::signal::TradeSignal;
use std::collections::HashMap;

/// Per-alpha weights before the combiner normalizes by their sum.
#[derive(Debug, Clone, Copy)]
pub struct AlphaWeights {
    pub ob_quality: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub liquidity: f64,
    pub ml_confidence: f64,
}

impl AlphaWeights {
    /// Fixed base weights the parameterized mode's gene multipliers apply to.
    pub const BASE: AlphaWeights = AlphaWeights {
        ob_quality: 1.0,
        momentum: 1.0,
        volatility: 1.0,
        liquidity: 1.0,
        ml_confidence: 1.0,
    };
}

/// One of the six fixed per-regime agents used in switching mode. The sixth,
/// `Generalist`, also covers `NewsDriven`, which the classifier never emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchingAgent {
    TrendHunter,
    MeanReversion,
    VolatilityFilter,
    BreakoutHunter,
    SentimentScout,
    Generalist,
}

impl SwitchingAgent {
    pub fn name(&self) -> &'static str {
        match self {
            SwitchingAgent::TrendHunter => "TrendHunter",
            SwitchingAgent::MeanReversion => "MeanReversion",
            SwitchingAgent::VolatilityFilter => "VolatilityFilter",
            SwitchingAgent::BreakoutHunter => "BreakoutHunter",
            SwitchingAgent::SentimentScout => "SentimentScout",
            SwitchingAgent::Generalist => "Generalist",
        }
    }

    pub fn for_regime(regime: Regime) -> Self {
        match regime {
            Regime::TrendingBullish | Regime::TrendingBearish => SwitchingAgent::TrendHunter,
            Regime::SidewaysRange => SwitchingAgent::MeanReversion,
            Regime::HighVolatility => SwitchingAgent::VolatilityFilter,
            Regime::BreakoutPending => SwitchingAgent::BreakoutHunter,
            Regime::NewsDriven => SwitchingAgent::SentimentScout,
        }
    }

    /// Fixed weight profile and signal threshold for this agent.
    pub fn profile(&self) -> (AlphaWeights, f64) {
        match self {
            SwitchingAgent::TrendHunter => (
                AlphaWeights {
                    ob_quality: 1.5,
                    momentum: 1.5,
                    volatility: 0.5,
                    liquidity: 0.5,
                    ml_confidence: 1.0,
                },
                0.55,
            ),
            SwitchingAgent::MeanReversion => (
                AlphaWeights {
                    ob_quality: 0.5,
                    momentum: 0.5,
                    volatility: 1.5,
                    liquidity: 1.5,
                    ml_confidence: 1.0,
                },
                0.55,
            ),
            SwitchingAgent::VolatilityFilter => (
                AlphaWeights {
                    ob_quality: 0.5,
                    momentum: 0.5,
                    volatility: 2.0,
                    liquidity: 0.5,
                    ml_confidence: 0.5,
                },
                0.70,
            ),
            SwitchingAgent::BreakoutHunter => (
                AlphaWeights {
                    ob_quality: 2.0,
                    momentum: 1.0,
                    volatility: 0.5,
                    liquidity: 1.5,
                    ml_confidence: 1.0,
                },
                0.55,
            ),
            SwitchingAgent::SentimentScout => (
                AlphaWeights {
                    ob_quality: 0.5,
                    momentum: 0.5,
                    volatility: 0.5,
                    liquidity: 0.5,
                    ml_confidence: 1.5,
                },
                0.55,
            ),
            SwitchingAgent::Generalist => (AlphaWeights::BASE, 0.60),
        }
    }
}

fn build_signal(
    state: &MarketState,
    weights: AlphaWeights,
    threshold: f64,
    predictor: &dyn PredictProba,
    symbol: &str,
    metadata: HashMap<String, String>,
) -> Option<TradeSignal> {
    let ob_quality = ObQualityAlpha;
    let momentum = MomentumAlpha;
    let volatility = VolatilityAlpha;
    let liquidity = LiquidityAlpha;
    let ml_confidence = MlConfidenceAlpha::new(predictor);

    let alphas: Vec<(&dyn Alpha, f64)> = vec![
        (&ob_quality as &dyn Alpha, weights.ob_quality),
        (&momentum as &dyn Alpha, weights.momentum),
        (&volatility as &dyn Alpha, weights.volatility),
        (&liquidity as &dyn Alpha, weights.liquidity),
        (&ml_confidence as &dyn Alpha, weights.ml_confidence),
    ];
    let combiner = AlphaCombiner::new(alphas);
    combiner.get_signal(state, threshold, symbol, metadata)
}

/// Hashes a parameter vector into a short stable tag for signal metadata,
/// without pulling in a dedicated hashing crate for twelve floats.
fn params_hash(params: &ParamVec) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    for (name, value) in params {
        name.hash(&mut hasher);
        value.to_bits().hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

/// Parameterized mode: weights are the fixed base weights multiplied by the
/// `g_*` genes, threshold is `alpha_threshold`, both drawn from `params`.
pub fn generate_signal_parameterized(
    state: &MarketState,
    params: &ParamVec,
    regime_thresholds: RegimeThresholds,
    predictor: &dyn PredictProba,
    symbol: &str,
) -> Option<TradeSignal> {
    let regime = classify_regime(state, regime_thresholds);

    let weights = AlphaWeights {
        ob_quality: AlphaWeights::BASE.ob_quality * params.get("g_ob_quality").copied().unwrap_or(1.0),
        momentum: AlphaWeights::BASE.momentum * params.get("g_momentum").copied().unwrap_or(1.0),
        volatility: AlphaWeights::BASE.volatility * params.get("g_volatility").copied().unwrap_or(1.0),
        liquidity: AlphaWeights::BASE.liquidity * params.get("g_liquidity").copied().unwrap_or(1.0),
        ml_confidence: AlphaWeights::BASE.ml_confidence
            * params.get("g_ml_confidence").copied().unwrap_or(1.0),
    };
    let threshold = params.get("alpha_threshold").copied().unwrap_or(0.60);

    let mut metadata = HashMap::new();
    metadata.insert("agent".to_string(), "WFO_Alpha_Combiner".to_string());
    metadata.insert("regime".to_string(), regime.to_string());
    metadata.insert("params_hash".to_string(), params_hash(params));

    build_signal(state, weights, threshold, predictor, symbol, metadata)
}

/// Switching mode: classify the regime, pick its fixed agent, delegate.
pub fn generate_signal_switching(
    state: &MarketState,
    regime_thresholds: RegimeThresholds,
    predictor: &dyn PredictProba,
    symbol: &str,
) -> Option<TradeSignal> {
    let regime = classify_regime(state, regime_thresholds);
    let agent = SwitchingAgent::for_regime(regime);
    let (weights, threshold) = agent.profile();

    let mut metadata = HashMap::new();
    metadata.insert("agent".to_string(), agent.name().to_string());
    metadata.insert("regime".to_string(), regime.to_string());

    build_signal(state, weights, threshold, predictor, symbol, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wfo::alphas::NoopPredictor;
    use crate::domain::wfo::param_space::ParamSpace;

    #[test]
    fn test_switching_picks_trend_hunter_for_bullish_regime() {
        assert_eq!(
            SwitchingAgent::for_regime(Regime::TrendingBullish),
            SwitchingAgent::TrendHunter
        );
    }

    #[test]
    fn test_switching_never_routes_through_news_driven_regime() {
        // The classifier never emits NewsDriven, but the dispatch table still
        // covers it so a future classifier change can't panic here.
        assert_eq!(
            SwitchingAgent::for_regime(Regime::NewsDriven),
            SwitchingAgent::SentimentScout
        );
    }

    #[test]
    fn test_parameterized_mode_is_neutral_on_empty_state() {
        let space = ParamSpace::default();
        let params = space.get_defaults();
        let state = MarketState::empty("BTCUSDT");
        let predictor = NoopPredictor;
        let signal = generate_signal_parameterized(
            &state,
            &params,
            RegimeThresholds::default(),
            &predictor,
            "BTCUSDT",
        );
        // An empty series drives every alpha to 0, so aggregate score is 0,
        // below any valid alpha_threshold.
        assert!(signal.is_none());
    }

    #[test]
    fn test_params_hash_is_deterministic() {
        let space = ParamSpace::default();
        let params = space.get_defaults();
        assert_eq!(params_hash(&params), params_hash(&params));
    }
}
