//! Analyze a single trajectory.

use std::path::PathBuf;

use pawtrace_common::config::AppConfig;
use pawtrace_model::bundle::METRICS_FILE;
use pawtrace_model::context::RunOutcome;

use super::{process_file, resolve_params};
use crate::InputArgs;

pub fn run(
    config: &AppConfig,
    input: PathBuf,
    args: InputArgs,
    output: Option<PathBuf>,
    charts: bool,
) -> anyhow::Result<()> {
    println!("Analyzing trajectory: {}", input.display());

    let params = resolve_params(config, &args)?;
    println!(
        "  fps={} confidence>={} smoothing={}/{}",
        params.fps,
        params.confidence_threshold,
        params.smoothing_window,
        params.smoothing_polyorder
    );

    let report = process_file(
        &input,
        &params,
        args.bodypart.as_deref(),
        output.as_deref(),
        &config.batch.results_suffix,
        charts,
    )?;

    match report.outcome {
        RunOutcome::NoInputData => {
            println!("\nNo input data: the trajectory has no valid samples.");
        }
        RunOutcome::NoEvents => {
            println!("\nNo events found.");
        }
        RunOutcome::Events(n) => {
            println!("\nDetected {n} grab event(s).");
        }
    }
    println!(
        "  Metrics: {}",
        report.results_dir.join(METRICS_FILE).display()
    );

    Ok(())
}
