// Walk-forward optimization I/O: CSV candle loading, trade persistence, and
// run-result serialization.
pub mod wfo;
