use super::signal::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A position owned by the broker for its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub metadata: HashMap<String, String>,
}

impl Position {
    /// `|entry - stop| * qty`, or notional `entry * qty` when there is no stop.
    pub fn risk_amount(&self) -> Decimal {
        (self.entry_price - self.stop_loss).abs() * self.quantity
    }
}

/// A closed position: the owning `Position` plus the realized exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedPosition {
    pub position: Position,
    pub exit_price: Decimal,
    pub net_pnl: Decimal,
}
