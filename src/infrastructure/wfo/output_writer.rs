//! Writes the final `{config, summary, windows}` JSON document a WFO run
//! produces.

use crate::application::wfo::driver::RunOutput;
use crate::domain::wfo::errors::PersistenceError;
use serde::Serialize;
use std::path::Path;

/// Serializes `config` (whatever the caller ran with — typically the
/// resolved `WfoConfig`) alongside the run's summary and per-window results,
/// to a single pretty-printed JSON file.
pub fn write_run_output(
    path: impl AsRef<Path>,
    config: &impl Serialize,
    output: &RunOutput,
) -> Result<(), PersistenceError> {
    let file = std::fs::File::create(path.as_ref()).map_err(|e| PersistenceError::WriteFailed {
        reason: e.to_string(),
    })?;
    serde_json::to_writer_pretty(
        file,
        &serde_json::json!({
            "config": config,
            "summary": output.summary,
            "windows": output.windows,
        }),
    )
    .map_err(|e| PersistenceError::WriteFailed {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::wfo::driver::{RunSummary, WindowResult};
    use crate::domain::wfo::param_space::ParamVec;
    use serde::Serialize;

    #[derive(Serialize)]
    struct StubConfig {
        symbol: String,
        year: i32,
    }

    fn stub_output() -> RunOutput {
        RunOutput {
            summary: RunSummary {
                initial_balance: 10000.0,
                final_balance: 11000.0,
                total_return_pct: 0.10,
                avg_test_pf: 1.2,
                median_test_pf: 1.15,
                pass_rate: 0.5,
                std_log_pf: 0.1,
                failing_windows: 1,
            },
            windows: vec![WindowResult {
                label: "Train:2024-01to2024-04_Test:2024-05".to_string(),
                train_fitness: 1.0,
                test_return: 0.05,
                test_pf: 1.2,
                test_sharpe: 1.0,
                test_maxdd: 0.1,
                test_trades: 10,
                test_win_rate: 0.6,
                start_balance: 10000.0,
                end_balance: 10500.0,
                optimal_params: ParamVec::new(),
                elapsed_secs: 1.5,
            }],
        }
    }

    #[test]
    fn test_writes_config_summary_windows_document() {
        let path = std::env::temp_dir().join(format!("wfo_output_test_{}.json", std::process::id()));
        let config = StubConfig {
            symbol: "BTCUSDT".to_string(),
            year: 2024,
        };
        let output = stub_output();

        write_run_output(&path, &config, &output).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["config"]["symbol"], "BTCUSDT");
        assert_eq!(parsed["summary"]["avg_test_pf"], 1.2);
        assert_eq!(parsed["windows"].as_array().unwrap().len(), 1);

        let _ = std::fs::remove_file(&path);
    }
}
