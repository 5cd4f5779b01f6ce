//! Deterministic fill simulation: entry fees, SL/TP checks against the
//! current price, exit fees, equity curve, and the closed-position log.

use crate::domain::wfo::position::{ClosedPosition, Position};
use crate::domain::wfo::signal::Side;
use rust_decimal::Decimal;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementResult {
    Filled,
    Rejected,
}

/// A single-symbol simulation broker. Owned by one backtest invocation.
#[derive(Debug, Clone)]
pub struct SimBroker {
    pub balance: Decimal,
    pub fee_rate: Decimal,
    pub open_positions: Vec<Position>,
    pub closed_positions: Vec<ClosedPosition>,
    pub equity_curve: Vec<Decimal>,
    pub total_fees_paid: Decimal,
}

impl SimBroker {
    pub fn new(initial_balance: Decimal, fee_rate: Decimal) -> Self {
        Self {
            balance: initial_balance,
            fee_rate,
            open_positions: Vec::new(),
            closed_positions: Vec::new(),
            equity_curve: vec![initial_balance],
            total_fees_paid: Decimal::ZERO,
        }
    }

    /// Rejects if balance is non-positive or the entry fee exceeds balance.
    /// Otherwise debits the fee, opens the position, and appends to the
    /// equity curve.
    pub fn place_order(
        &mut self,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        symbol: &str,
        metadata: std::collections::HashMap<String, String>,
    ) -> PlacementResult {
        if self.balance <= Decimal::ZERO {
            return PlacementResult::Rejected;
        }
        let entry_fee = quantity * price * self.fee_rate;
        if entry_fee > self.balance {
            return PlacementResult::Rejected;
        }

        self.balance -= entry_fee;
        self.total_fees_paid += entry_fee;
        self.open_positions.push(Position {
            symbol: symbol.to_string(),
            side,
            quantity,
            entry_price: price,
            stop_loss,
            take_profit,
            metadata,
        });
        self.equity_curve.push(self.balance);
        PlacementResult::Filled
    }

    /// Checks every open position's SL/TP against `current_price`; closes
    /// any that trigger. Fill price is the trigger level, not
    /// `current_price`. If both SL and TP would trigger in the same check,
    /// SL takes priority (the conservative assumption).
    pub fn update_positions(&mut self, current_price: Decimal) {
        let mut still_open = Vec::with_capacity(self.open_positions.len());
        for position in self.open_positions.drain(..) {
            let trigger = match position.side {
                Side::Buy => {
                    if current_price <= position.stop_loss {
                        Some(position.stop_loss)
                    } else if current_price >= position.take_profit {
                        Some(position.take_profit)
                    } else {
                        None
                    }
                }
                Side::Sell => {
                    if current_price >= position.stop_loss {
                        Some(position.stop_loss)
                    } else if current_price <= position.take_profit {
                        Some(position.take_profit)
                    } else {
                        None
                    }
                }
            };

            match trigger {
                Some(exit_price) => self.close_position(position, exit_price),
                None => still_open.push(position),
            }
        }
        self.open_positions = still_open;
    }

    fn close_position(&mut self, position: Position, exit_price: Decimal) {
        let gross_pnl = (exit_price - position.entry_price) * position.quantity * position.side.sign();
        let exit_fee = position.quantity * exit_price * self.fee_rate;
        let net_pnl = gross_pnl - exit_fee;

        self.balance += net_pnl;
        self.total_fees_paid += exit_fee;
        self.equity_curve.push(self.balance);

        debug!(
            symbol = %position.symbol,
            net_pnl = %net_pnl,
            "closed position"
        );

        self.closed_positions.push(ClosedPosition {
            position,
            exit_price,
            net_pnl,
        });
    }

    /// `(peak - balance) / peak` where `peak = max(equity_curve)`.
    pub fn get_current_drawdown_pct(&self) -> f64 {
        let peak = self
            .equity_curve
            .iter()
            .copied()
            .fold(Decimal::ZERO, Decimal::max);
        if peak <= Decimal::ZERO {
            return 0.0;
        }
        use rust_decimal::prelude::ToPrimitive;
        ((peak - self.balance) / peak).to_f64().unwrap_or(0.0).max(0.0)
    }

    /// Sum over open positions of `|entry - stop| * qty`; a position with no
    /// stop (entry == stop_loss, which risk sizing never produces) is
    /// treated as its full notional.
    pub fn get_open_risk(&self) -> Decimal {
        self.open_positions
            .iter()
            .map(|p| {
                if p.entry_price == p.stop_loss {
                    p.entry_price * p.quantity
                } else {
                    p.risk_amount()
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_entry_fee_debited_on_fill() {
        let mut broker = SimBroker::new(dec!(10000), dec!(0.001));
        let result = broker.place_order(
            Side::Buy,
            dec!(1),
            dec!(100),
            dec!(90),
            dec!(120),
            "BTCUSDT",
            HashMap::new(),
        );
        assert_eq!(result, PlacementResult::Filled);
        assert_eq!(broker.balance, dec!(9999.9));
    }

    #[test]
    fn test_sl_hit_matches_worked_example() {
        let mut broker = SimBroker::new(dec!(10000), dec!(0.001));
        broker.place_order(
            Side::Buy,
            dec!(1),
            dec!(100),
            dec!(90),
            dec!(120),
            "BTCUSDT",
            HashMap::new(),
        );
        broker.update_positions(dec!(90));

        assert_eq!(broker.closed_positions.len(), 1);
        let closed = &broker.closed_positions[0];
        assert_eq!(closed.exit_price, dec!(90));
        assert_eq!(closed.net_pnl, dec!(-10.09));
        assert_eq!(broker.balance, dec!(9989.81));
    }

    #[test]
    fn test_sl_priority_when_both_trigger() {
        // A bar whose close sits exactly at the TP level would also satisfy
        // an SL check only if price <= SL too; construct a position where
        // the current price trades through both SL and TP simultaneously
        // (only possible with a degenerate SL >= TP for a long, used here
        // purely to exercise the priority rule).
        let mut broker = SimBroker::new(dec!(10000), dec!(0.001));
        broker.place_order(
            Side::Buy,
            dec!(1),
            dec!(100),
            dec!(95),
            dec!(95),
            "BTCUSDT",
            HashMap::new(),
        );
        broker.update_positions(dec!(95));
        assert_eq!(broker.closed_positions[0].exit_price, dec!(95));
    }

    #[test]
    fn test_short_position_symmetric_fills() {
        let mut broker = SimBroker::new(dec!(10000), dec!(0.001));
        broker.place_order(
            Side::Sell,
            dec!(1),
            dec!(100),
            dec!(110),
            dec!(80),
            "BTCUSDT",
            HashMap::new(),
        );
        broker.update_positions(dec!(80));
        let closed = &broker.closed_positions[0];
        // gross = (80 - 100) * 1 * -1 = 20
        assert!(closed.net_pnl > dec!(19) && closed.net_pnl < dec!(20));
    }

    #[test]
    fn test_open_risk_sums_distance_times_quantity() {
        let mut broker = SimBroker::new(dec!(10000), dec!(0.001));
        broker.place_order(
            Side::Buy,
            dec!(2),
            dec!(100),
            dec!(90),
            dec!(120),
            "BTCUSDT",
            HashMap::new(),
        );
        assert_eq!(broker.get_open_risk(), dec!(20));
    }

    #[test]
    fn test_drawdown_pct_from_peak() {
        let mut broker = SimBroker::new(dec!(10000), dec!(0.001));
        broker.equity_curve.push(dec!(12000));
        broker.balance = dec!(9000);
        broker.equity_curve.push(dec!(9000));
        let dd = broker.get_current_drawdown_pct();
        assert!((dd - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_when_balance_exhausted() {
        let mut broker = SimBroker::new(dec!(0), dec!(0.001));
        let result = broker.place_order(
            Side::Buy,
            dec!(1),
            dec!(100),
            dec!(90),
            dec!(120),
            "BTCUSDT",
            HashMap::new(),
        );
        assert_eq!(result, PlacementResult::Rejected);
    }
}
