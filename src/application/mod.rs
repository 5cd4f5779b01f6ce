// Walk-forward optimization orchestration: risk sizing, the simulation
// broker, the alpha orchestrator, the backtest engine, and the WFO driver.
pub mod wfo;
