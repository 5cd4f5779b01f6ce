//! Configuration for the walk-forward optimizer.

pub mod wfo_config;

pub use wfo_config::WfoConfig;
