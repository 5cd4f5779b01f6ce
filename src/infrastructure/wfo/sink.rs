//! Pluggable trade persistence. Disabled during optimization (the fitness
//! hot loop never touches disk); available for the final per-window test
//! segment and any outside caller that wants a durable trade log.

use crate::domain::wfo::errors::PersistenceError;
use crate::domain::wfo::position::ClosedPosition;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// One closed trade, flattened for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub side: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub net_pnl: Decimal,
    pub metadata: std::collections::HashMap<String, String>,
}

impl TradeRecord {
    pub fn from_closed(symbol: &str, closed: &ClosedPosition) -> Self {
        Self {
            symbol: symbol.to_string(),
            side: format!("{:?}", closed.position.side),
            quantity: closed.position.quantity,
            entry_price: closed.position.entry_price,
            exit_price: closed.exit_price,
            net_pnl: closed.net_pnl,
            metadata: closed.position.metadata.clone(),
        }
    }
}

/// A durable destination for closed trades. Implementations are expected to
/// disable themselves after the first write failure rather than keep
/// retrying a broken destination mid-run.
pub trait TradeSink: Send {
    fn record_trade(&mut self, trade: &TradeRecord) -> Result<(), PersistenceError>;
}

/// Swallows every trade. Used while the GA is searching parameter space —
/// millions of simulated trades with nowhere useful to go.
#[derive(Debug, Default)]
pub struct NullSink;

impl TradeSink for NullSink {
    fn record_trade(&mut self, _trade: &TradeRecord) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Appends one JSON object per line to `path`. Once a write fails the sink
/// marks itself disabled and silently no-ops for the rest of the run —
/// the backtest itself must never fail because persistence did.
pub struct JsonFileSink {
    path: PathBuf,
    disabled: bool,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            disabled: false,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

impl TradeSink for JsonFileSink {
    fn record_trade(&mut self, trade: &TradeRecord) -> Result<(), PersistenceError> {
        if self.disabled {
            return Ok(());
        }

        let write_result = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            let line = serde_json::to_string(trade).map_err(std::io::Error::other)?;
            writeln!(file, "{line}")
        })();

        if let Err(e) = write_result {
            warn!(path = %self.path.display(), error = %e, "trade sink write failed, disabling for remainder of run");
            self.disabled = true;
            return Err(PersistenceError::WriteFailed {
                reason: e.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wfo::position::Position;
    use crate::domain::wfo::signal::Side;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn sample_closed() -> ClosedPosition {
        ClosedPosition {
            position: Position {
                symbol: "BTCUSDT".to_string(),
                side: Side::Buy,
                quantity: dec!(1),
                entry_price: dec!(100),
                stop_loss: dec!(90),
                take_profit: dec!(120),
                metadata: HashMap::new(),
            },
            exit_price: dec!(120),
            net_pnl: dec!(19.78),
        }
    }

    #[test]
    fn test_null_sink_always_succeeds() {
        let mut sink = NullSink;
        let record = TradeRecord::from_closed("BTCUSDT", &sample_closed());
        assert!(sink.record_trade(&record).is_ok());
    }

    #[test]
    fn test_json_file_sink_appends_lines() {
        let path = std::env::temp_dir().join(format!("wfo_sink_test_{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut sink = JsonFileSink::new(&path);
        let record = TradeRecord::from_closed("BTCUSDT", &sample_closed());

        sink.record_trade(&record).unwrap();
        sink.record_trade(&record).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(!sink.is_disabled());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_file_sink_disables_on_write_failure() {
        // A directory path can never be opened for append; this forces the
        // one failure path this sink has.
        let mut sink = JsonFileSink::new(std::env::temp_dir());
        let record = TradeRecord::from_closed("BTCUSDT", &sample_closed());
        let result = sink.record_trade(&record);
        assert!(result.is_err());
        assert!(sink.is_disabled());

        // A second call against the disabled sink no-ops instead of failing again.
        assert!(sink.record_trade(&record).is_ok());
    }
}
