//! Fixed-percentage position sizing with drawdown scaling and a
//! portfolio-heat cap.

use crate::domain::wfo::errors::InvalidStop;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct RiskConfig {
    pub risk_percentage: Decimal,
    pub max_portfolio_risk: Option<Decimal>,
    pub use_dd_scaling: bool,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_percentage: dec!(0.01),
            max_portfolio_risk: None,
            use_dd_scaling: true,
        }
    }
}

/// `R = balance * risk_percentage`, scaled down under drawdown and capped by
/// remaining portfolio heat, then converted to quantity via `R / |entry - stop|`.
pub fn calculate_position_size(
    config: &RiskConfig,
    balance: Decimal,
    entry: Decimal,
    stop_loss: Decimal,
    open_risk: Decimal,
    drawdown_pct: f64,
) -> Result<Decimal, InvalidStop> {
    if entry == stop_loss {
        return Err(InvalidStop::EntryEqualsStop { entry, stop_loss });
    }

    let mut risk_amount = balance * config.risk_percentage;

    if config.use_dd_scaling && drawdown_pct > 0.0 {
        let multiplier = (1.0 - 2.0 * drawdown_pct).max(0.5);
        let multiplier =
            Decimal::try_from(multiplier).unwrap_or(Decimal::ONE);
        risk_amount *= multiplier;
    }

    if let Some(max_portfolio_risk) = config.max_portfolio_risk {
        let available = balance * max_portfolio_risk - open_risk;
        if available <= Decimal::ZERO {
            debug!(
                "risk manager: portfolio heat exhausted, available={}",
                available
            );
            return Ok(Decimal::ZERO);
        }
        risk_amount = risk_amount.min(available);
    }

    let distance = (entry - stop_loss).abs();
    Ok(risk_amount / distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_equals_stop_errors() {
        let config = RiskConfig::default();
        let result = calculate_position_size(
            &config,
            dec!(10000),
            dec!(100),
            dec!(100),
            Decimal::ZERO,
            0.0,
        );
        assert!(matches!(result, Err(InvalidStop::EntryEqualsStop { .. })));
    }

    #[test]
    fn test_basic_sizing() {
        let config = RiskConfig {
            risk_percentage: dec!(0.01),
            max_portfolio_risk: None,
            use_dd_scaling: false,
        };
        let qty =
            calculate_position_size(&config, dec!(10000), dec!(100), dec!(90), Decimal::ZERO, 0.0)
                .unwrap();
        // risk = 100, distance = 10 -> qty = 10
        assert_eq!(qty, dec!(10));
    }

    #[test]
    fn test_drawdown_scaling_halves_at_cap() {
        let config = RiskConfig {
            risk_percentage: dec!(0.01),
            max_portfolio_risk: None,
            use_dd_scaling: true,
        };
        // drawdown_pct=0.30 -> multiplier = max(0.5, 1 - 0.6) = 0.5
        let qty =
            calculate_position_size(&config, dec!(10000), dec!(100), dec!(90), Decimal::ZERO, 0.30)
                .unwrap();
        assert_eq!(qty, dec!(5));
    }

    #[test]
    fn test_portfolio_heat_cap_returns_zero_when_exhausted() {
        let config = RiskConfig {
            risk_percentage: dec!(0.05),
            max_portfolio_risk: Some(dec!(0.02)),
            use_dd_scaling: false,
        };
        // available = 10000*0.02 - 300 = -100 -> exhausted
        let qty =
            calculate_position_size(&config, dec!(10000), dec!(100), dec!(90), dec!(300), 0.0)
                .unwrap();
        assert_eq!(qty, Decimal::ZERO);
    }

    #[test]
    fn test_portfolio_heat_cap_limits_risk_amount() {
        let config = RiskConfig {
            risk_percentage: dec!(0.05),
            max_portfolio_risk: Some(dec!(0.10)),
            use_dd_scaling: false,
        };
        // uncapped risk = 500, available = 10000*0.10 - 400 = 600 -> not limiting
        let qty =
            calculate_position_size(&config, dec!(10000), dec!(100), dec!(90), dec!(400), 0.0)
                .unwrap();
        assert_eq!(qty, dec!(50));
    }
}
