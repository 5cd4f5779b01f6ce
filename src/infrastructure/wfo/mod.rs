//! I/O at the edges of the walk-forward pipeline: candle CSV loading, the
//! pluggable trade sink, and the run-output writer. The hot loop
//! (`application::wfo`) touches none of this.

pub mod csv_loader;
pub mod output_writer;
pub mod sink;
