//! Segment-level backtest metrics and the score/penalty formulas the
//! fitness function composes.

use super::param_space::{ParamSpace, ParamVec};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Metrics summarizing one completed backtest segment. All fractional
/// values are fractions (0.20 = 20%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentMetrics {
    pub trades: usize,
    pub return_pct: f64,
    pub maxdd: f64,
    pub sharpe: f64,
    pub pf: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
}

impl SegmentMetrics {
    pub fn zero_trades() -> Self {
        Self {
            trades: 0,
            return_pct: 0.0,
            maxdd: 0.0,
            sharpe: 0.0,
            pf: 1.0,
            gross_profit: 0.0,
            gross_loss: 0.0,
        }
    }

    /// Computes metrics from the closed-position PnL stream and the broker's
    /// equity curve.
    pub fn compute(
        initial_balance: Decimal,
        final_balance: Decimal,
        closed_pnls: &[Decimal],
        equity_curve: &[Decimal],
    ) -> Self {
        if closed_pnls.is_empty() {
            return Self::zero_trades();
        }

        let return_pct = if initial_balance > Decimal::ZERO {
            ((final_balance - initial_balance) / initial_balance)
                .to_f64()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        let maxdd = max_drawdown(equity_curve);

        let gross_profit: f64 = closed_pnls
            .iter()
            .filter(|&&p| p > Decimal::ZERO)
            .filter_map(|p| p.to_f64())
            .sum();
        let gross_loss: f64 = closed_pnls
            .iter()
            .filter(|&&p| p < Decimal::ZERO)
            .filter_map(|p| p.to_f64())
            .sum::<f64>()
            .abs();

        let pf = if gross_loss == 0.0 && gross_profit > 0.0 {
            10.0
        } else if gross_loss == 0.0 {
            1.0
        } else {
            gross_profit / gross_loss
        };

        let sharpe = sharpe_from_equity_curve(equity_curve);

        Self {
            trades: closed_pnls.len(),
            return_pct,
            maxdd,
            sharpe,
            pf,
            gross_profit,
            gross_loss,
        }
    }
}

/// Left-to-right scan tracking the running peak; returns the maximum
/// fractional decline observed.
pub fn max_drawdown(equity_curve: &[Decimal]) -> f64 {
    let mut peak = Decimal::ZERO;
    let mut worst = 0.0f64;
    for &value in equity_curve {
        if value > peak {
            peak = value;
        }
        if peak > Decimal::ZERO {
            let dd = ((peak - value) / peak).to_f64().unwrap_or(0.0);
            if dd > worst {
                worst = dd;
            }
        }
    }
    worst
}

/// `sharpe = mean(r) / stdev(r) * sqrt(len(r))` over per-step returns of the
/// equity curve, `0` if the sample standard deviation is zero.
pub fn sharpe_from_equity_curve(equity_curve: &[Decimal]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter_map(|w| {
            let (prev, cur) = (w[0], w[1]);
            if prev > Decimal::ZERO {
                ((cur - prev) / prev).to_f64()
            } else {
                None
            }
        })
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stdev = variance.sqrt();
    if stdev > 0.0 {
        (mean / stdev) * n.sqrt()
    } else {
        0.0
    }
}

/// `trade_factor * (0.60 * calmar + 0.40 * sharpe)` where
/// `trade_factor = min(1, trades/30)`, `calmar = return_pct / max(maxdd, 0.05)`.
pub fn score_segment(m: &SegmentMetrics) -> f64 {
    let trade_factor = (m.trades as f64 / 30.0).min(1.0);
    let maxdd_safe = m.maxdd.max(0.05);
    let calmar = m.return_pct / maxdd_safe;
    trade_factor * (0.60 * calmar + 0.40 * m.sharpe)
}

/// Penalizes a validation segment that degrades sharply relative to its
/// SubTrain counterpart.
pub fn overfit_penalty(sub: &SegmentMetrics, val: &SegmentMetrics) -> f64 {
    let pf_deg = val.pf / sub.pf.max(0.01);
    let sharpe_deg = (val.sharpe + 2.0) / (sub.sharpe + 2.0).max(0.1);
    2.0 * (0.70 - pf_deg).max(0.0) + 1.0 * (0.75 - sharpe_deg).max(0.0)
}

/// `0.15 * sum(|(p_i - default_i) / (max_i - min_i)|)` over every gene.
pub fn regularization_penalty(space: &ParamSpace, params: &ParamVec) -> f64 {
    let mut total = 0.0;
    for (&name, def) in &space.defs {
        let value = *params.get(name).unwrap_or(&def.default);
        let range = def.max - def.min;
        if range > 0.0 {
            total += ((value - def.default) / range).abs();
        }
    }
    0.15 * total
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pf_ten_when_no_losses() {
        let m = SegmentMetrics::compute(
            dec!(10000),
            dec!(10500),
            &[dec!(100), dec!(50)],
            &[dec!(10000), dec!(10100), dec!(10500)],
        );
        assert_eq!(m.pf, 10.0);
    }

    #[test]
    fn test_pf_one_when_zero_trades() {
        let m = SegmentMetrics::compute(dec!(10000), dec!(10000), &[], &[dec!(10000)]);
        assert_eq!(m.pf, 1.0);
        assert_eq!(m.trades, 0);
    }

    #[test]
    fn test_max_drawdown_from_peak() {
        let curve = vec![dec!(100), dec!(120), dec!(90), dec!(110)];
        let dd = max_drawdown(&curve);
        assert!((dd - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_regularization_penalty_zero_at_defaults() {
        let space = ParamSpace::default();
        let defaults = space.get_defaults();
        assert_eq!(regularization_penalty(&space, &defaults), 0.0);
    }
}
