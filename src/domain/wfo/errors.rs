use thiserror::Error;

/// Errors raised while constructing or validating a `Candle`.
#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("candle high {high} is below max(open={open}, close={close}, low={low})")]
    HighBelowBody {
        high: rust_decimal::Decimal,
        open: rust_decimal::Decimal,
        close: rust_decimal::Decimal,
        low: rust_decimal::Decimal,
    },

    #[error("candle low {low} is above min(open={open}, close={close}, high={high})")]
    LowAboveBody {
        low: rust_decimal::Decimal,
        open: rust_decimal::Decimal,
        close: rust_decimal::Decimal,
        high: rust_decimal::Decimal,
    },

    #[error("candle volume {volume} is negative")]
    NegativeVolume { volume: rust_decimal::Decimal },

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ConstructionError>,
    },
}

/// Errors raised by the risk manager.
#[derive(Debug, Error)]
pub enum InvalidStop {
    #[error("entry price {entry} equals stop loss {stop_loss}")]
    EntryEqualsStop {
        entry: rust_decimal::Decimal,
        stop_loss: rust_decimal::Decimal,
    },
}

/// Errors raised while loading candle data.
#[derive(Debug, Error)]
pub enum DataMissing {
    #[error("candle file not found: {path}")]
    FileNotFound { path: String },

    #[error("candle file is empty: {path}")]
    Empty { path: String },
}

/// Raised when the window generator cannot produce any window for the configured year.
#[derive(Debug, Error)]
pub enum NoWindows {
    #[error(
        "year {year} cannot fit train={train_months}mo + test={test_months}mo windows (need <= 12 months total)"
    )]
    InsufficientMonths {
        year: i32,
        train_months: u32,
        test_months: u32,
    },

    #[error("step_months ({step_months}) must equal test_months ({test_months})")]
    StepMismatch { step_months: u32, test_months: u32 },
}

/// Raised by (or on behalf of) the ML predictor plug-in.
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("predictor unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Raised by the trade sink plug-in.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("trade sink write failed: {reason}")]
    WriteFailed { reason: String },
}

/// Aggregate error type for the WFO pipeline's fallible edges.
#[derive(Debug, Error)]
pub enum WfoError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    InvalidStop(#[from] InvalidStop),

    #[error(transparent)]
    DataMissing(#[from] DataMissing),

    #[error(transparent)]
    NoWindows(#[from] NoWindows),

    #[error(transparent)]
    Predictor(#[from] PredictorError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_construction_error_formatting() {
        let err = ConstructionError::HighBelowBody {
            high: dec!(10),
            open: dec!(12),
            close: dec!(11),
            low: dec!(9),
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn test_no_windows_formatting() {
        let err = NoWindows::InsufficientMonths {
            year: 2024,
            train_months: 11,
            test_months: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("2024"));
        assert!(msg.contains("11"));
    }

    #[test]
    fn test_wfo_error_from_conversion() {
        let stop_err: WfoError = InvalidStop::EntryEqualsStop {
            entry: dec!(100),
            stop_loss: dec!(100),
        }
        .into();
        assert!(matches!(stop_err, WfoError::InvalidStop(_)));
    }
}
