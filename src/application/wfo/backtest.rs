//! Bar-by-bar backtest engine: advances market state, checks broker fills,
//! requests signals when flat, sizes and places orders, and reduces the
//! whole run to `SegmentMetrics`.

use super::broker::SimBroker;
use super::risk::{calculate_position_size, RiskConfig};
use crate::domain::wfo::alphas::PredictProba;
use crate::domain::wfo::candle::Candle;
use crate::domain::wfo::market_state::MarketState;
use crate::domain::wfo::metrics::SegmentMetrics;
use crate::domain::wfo::param_space::ParamVec;
use crate::domain::wfo::regime::RegimeThresholds;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use super::orchestrator::generate_signal_parameterized;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_balance: Decimal,
    pub fee_rate: Decimal,
    pub risk: RiskConfig,
    pub regime_thresholds: RegimeThresholds,
    pub fallback_atr_distance: Decimal,
    /// When true, trade sink persistence is bypassed (always true during WFO).
    pub optimize_mode: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: dec!(10000),
            fee_rate: dec!(0.001),
            risk: RiskConfig::default(),
            regime_thresholds: RegimeThresholds::default(),
            fallback_atr_distance: dec!(1),
            optimize_mode: true,
        }
    }
}

/// A completed backtest's summary metrics plus the raw closed-PnL stream,
/// so callers needing derived stats (e.g. win rate) don't have to re-run it.
#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub metrics: SegmentMetrics,
    pub closed_pnls: Vec<Decimal>,
}

/// Runs the bar-by-bar loop over `warmup ++ main` and returns the resulting
/// outcome. `warmup` bars advance market state and broker fills but never
/// generate signals. `params` drives weights/threshold/SL-TP multipliers
/// through the parameterized orchestrator.
pub fn run_backtest(
    symbol: &str,
    warmup: &[Candle],
    main: &[Candle],
    params: &ParamVec,
    config: &BacktestConfig,
    predictor: &dyn PredictProba,
) -> BacktestOutcome {
    let mut state = MarketState::empty(symbol);
    let mut broker = SimBroker::new(config.initial_balance, config.fee_rate);

    let stop_loss_atr_mult = params.get("stop_loss_atr_mult").copied().unwrap_or(2.0);
    let take_profit_r_mult = params.get("take_profit_r_mult").copied().unwrap_or(2.0);
    let risk_per_trade_pct = params.get("risk_per_trade_pct").copied().unwrap_or(1.0) / 100.0;

    let risk_config = RiskConfig {
        risk_percentage: Decimal::try_from(risk_per_trade_pct).unwrap_or(config.risk.risk_percentage),
        ..config.risk
    };

    let warmup_len = warmup.len();
    for (idx, candle) in warmup.iter().chain(main.iter()).enumerate() {
        state = state.update(*candle);
        broker.update_positions(candle.close);

        if idx < warmup_len {
            continue;
        }

        if broker.open_positions.is_empty() {
            if let Some(mut signal) = generate_signal_parameterized(
                &state,
                params,
                config.regime_thresholds,
                predictor,
                symbol,
            ) {
                let atr = state.current_atr();
                let atr_decimal = Decimal::try_from(atr).unwrap_or(config.fallback_atr_distance);
                let sl_mult = Decimal::try_from(stop_loss_atr_mult).unwrap_or(dec!(2));
                let tp_mult = Decimal::try_from(take_profit_r_mult).unwrap_or(dec!(2));

                let sl_distance = if atr_decimal > Decimal::ZERO {
                    atr_decimal * sl_mult
                } else {
                    config.fallback_atr_distance
                };
                let tp_distance = sl_distance * tp_mult;
                let entry_price = candle.close;

                let sign = signal.side.sign();
                signal.entry_price = entry_price;
                signal.stop_loss = entry_price - sign * sl_distance;
                signal.take_profit = entry_price + sign * tp_distance;

                let drawdown_pct = broker.get_current_drawdown_pct();
                let open_risk = broker.get_open_risk();

                match calculate_position_size(
                    &risk_config,
                    broker.balance,
                    signal.entry_price,
                    signal.stop_loss,
                    open_risk,
                    drawdown_pct,
                ) {
                    Ok(quantity) if quantity > Decimal::ZERO => {
                        broker.place_order(
                            signal.side,
                            quantity,
                            signal.entry_price,
                            signal.stop_loss,
                            signal.take_profit,
                            symbol,
                            signal.metadata,
                        );
                        // Trade-sink persistence happens here in a live run;
                        // `config.optimize_mode` bypasses it during WFO.
                    }
                    Ok(_) => {}
                    Err(err) => warn!("risk sizing rejected signal: {err}"),
                }
            }
        }
    }

    let closed_pnls: Vec<Decimal> = broker.closed_positions.iter().map(|c| c.net_pnl).collect();
    let metrics = SegmentMetrics::compute(
        config.initial_balance,
        broker.balance,
        &closed_pnls,
        &broker.equity_curve,
    );
    BacktestOutcome {
        metrics,
        closed_pnls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wfo::alphas::NoopPredictor;
    use crate::domain::wfo::param_space::ParamSpace;
    use crate::domain::wfo::timeframe::Timeframe;

    fn flat_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = dec!(100);
                Candle::new(
                    i as i64,
                    close,
                    close + dec!(1),
                    close - dec!(1),
                    close,
                    dec!(10),
                    Timeframe::H4,
                    true,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_backtest_on_empty_main_returns_zero_trades() {
        let space = ParamSpace::default();
        let params = space.get_defaults();
        let config = BacktestConfig::default();
        let predictor = NoopPredictor;
        let outcome = run_backtest("BTCUSDT", &[], &[], &params, &config, &predictor);
        assert_eq!(outcome.metrics.trades, 0);
        assert_eq!(outcome.metrics.pf, 1.0);
    }

    #[test]
    fn test_backtest_on_flat_series_stays_near_initial_balance() {
        let space = ParamSpace::default();
        let params = space.get_defaults();
        let config = BacktestConfig::default();
        let predictor = NoopPredictor;
        let warmup = flat_candles(60);
        let main = flat_candles(30);
        let outcome = run_backtest("BTCUSDT", &warmup, &main, &params, &config, &predictor);
        // A perfectly flat series never moves RSI off neutral or triggers any
        // alpha strongly enough to clear alpha_threshold, so no trades open.
        assert_eq!(outcome.metrics.trades, 0);
    }
}
