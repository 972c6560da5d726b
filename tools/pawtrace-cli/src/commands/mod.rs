//! Subcommand implementations and the helpers they share.

pub mod analyze;
pub mod batch;
pub mod init;
pub mod validate;

use std::path::{Path, PathBuf};

use pawtrace_common::clock::run_timestamp;
use pawtrace_common::config::AppConfig;
use pawtrace_common::error::PawtraceError;
use pawtrace_model::bundle::{BundleManifest, ResultsBundle};
use pawtrace_model::context::RunOutcome;
use pawtrace_model::params::AnalysisParams;
use pawtrace_model::sample::Trajectory;
use pawtrace_model::table::parse_table;
use pawtrace_processing_core::charts::{ChartSource, CHART_DATA_FILE};

use crate::InputArgs;

/// Resolve run parameters: explicit file, then the configured default file,
/// then built-in defaults, with command-line overrides applied last.
pub fn resolve_params(config: &AppConfig, args: &InputArgs) -> anyhow::Result<AnalysisParams> {
    let file = args.params.as_ref().or(config.params_file.as_ref());
    let mut params = match file {
        Some(path) => AnalysisParams::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load parameters: {e}"))?,
        None => AnalysisParams::default(),
    };

    if let Some(fps) = args.fps {
        params.fps = fps;
    }
    if let Some(confidence) = args.confidence {
        params.confidence_threshold = confidence;
    }
    params
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid parameters: {e}"))?;
    Ok(params)
}

/// Read and parse a keypoint table.
pub fn load_trajectory(
    path: &Path,
    fps: f64,
    bodypart: Option<&str>,
) -> anyhow::Result<Trajectory> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    parse_table(&text, fps, bodypart)
        .map_err(PawtraceError::from)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))
}

/// Where one input's results ended up.
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub results_dir: PathBuf,
    pub outcome: RunOutcome,
}

impl FileReport {
    /// One-line, user-facing description of the outcome.
    pub fn summary(&self) -> String {
        match self.outcome {
            RunOutcome::NoInputData => "no input data (no valid samples)".to_string(),
            RunOutcome::NoEvents => "no events found".to_string(),
            RunOutcome::Events(n) => format!("{n} event(s)"),
        }
    }
}

/// Analyze one input file and persist its results bundle.
pub fn process_file(
    input: &Path,
    params: &AnalysisParams,
    bodypart: Option<&str>,
    output_dir: Option<&Path>,
    suffix: &str,
    charts: bool,
) -> anyhow::Result<FileReport> {
    let trajectory = load_trajectory(input, params.fps, bodypart)?;

    let context = pawtrace_processing_core::analyze(&trajectory, params).map_err(|e| {
        if e.is_caller_error() {
            anyhow::anyhow!("Invalid parameters: {e}")
        } else {
            anyhow::anyhow!("Internal computation error: {e}")
        }
    })?;

    let results_dir = ResultsBundle::path_for_input(input, output_dir, suffix);
    let bundle = ResultsBundle::create(&results_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create results directory: {e}"))?;

    bundle
        .write_metrics(&context)
        .map_err(|e| anyhow::anyhow!("Failed to write metrics: {e}"))?;
    let slices = bundle
        .write_event_trajectories(&context)
        .map_err(|e| anyhow::anyhow!("Failed to write event trajectories: {e}"))?;
    bundle
        .write_context(&context)
        .map_err(|e| anyhow::anyhow!("Failed to write context: {e}"))?;
    bundle
        .write_manifest(&BundleManifest {
            version: env!("CARGO_PKG_VERSION").to_string(),
            source: input.display().to_string(),
            created_at: run_timestamp(),
            params: params.clone(),
            event_count: context.results.len(),
        })
        .map_err(|e| anyhow::anyhow!("Failed to write manifest: {e}"))?;
    tracing::debug!(slices, dir = %results_dir.display(), "results written");

    // Chart data is optional output; the metrics above stand on their own.
    if charts {
        if let Err(e) = bundle.write_figure_data(CHART_DATA_FILE, &context.chart_data()) {
            tracing::warn!(error = %e, "chart data not written");
        }
    }

    Ok(FileReport {
        input: input.to_path_buf(),
        results_dir,
        outcome: context.outcome(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> InputArgs {
        InputArgs {
            params: None,
            fps: None,
            confidence: None,
            bodypart: None,
        }
    }

    #[test]
    fn test_overrides_apply_after_defaults() {
        let params = resolve_params(
            &AppConfig::default(),
            &InputArgs {
                fps: Some(60.0),
                confidence: Some(0.9),
                ..args()
            },
        )
        .unwrap();
        assert_eq!(params.fps, 60.0);
        assert_eq!(params.confidence_threshold, 0.9);
        assert_eq!(params.smoothing_window, 7);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let err = resolve_params(
            &AppConfig::default(),
            &InputArgs {
                confidence: Some(1.5),
                ..args()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid parameters"));
    }

    #[test]
    fn test_process_file_without_valid_samples() {
        let dir = std::env::temp_dir().join("pawtrace_test_cli_process");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("mouse.csv");
        std::fs::write(&input, "x,y,likelihood\n,,\n,,\n").unwrap();

        let report = process_file(
            &input,
            &AnalysisParams::default(),
            None,
            None,
            "_results",
            true,
        )
        .unwrap();

        assert_eq!(report.outcome, RunOutcome::NoInputData);
        assert_eq!(report.results_dir, dir.join("mouse_results"));
        assert!(report.results_dir.join("catch_analysis_results.csv").exists());
        assert!(report.results_dir.join("figures").join(CHART_DATA_FILE).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_table_is_reported() {
        let dir = std::env::temp_dir().join("pawtrace_test_cli_malformed");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("bad.csv");
        std::fs::write(&input, "x,y\n1,2\n").unwrap();

        let err = process_file(&input, &AnalysisParams::default(), None, None, "_r", false)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
        assert!(err.to_string().contains("Input error: Missing required column"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
