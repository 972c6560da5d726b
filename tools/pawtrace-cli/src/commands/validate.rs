//! Report how a trajectory fares through cleaning.

use std::path::PathBuf;

use pawtrace_common::config::AppConfig;
use pawtrace_processing_core::cleaning::CleaningPipeline;

use super::{load_trajectory, resolve_params};
use crate::InputArgs;

pub fn run(config: &AppConfig, input: PathBuf, args: InputArgs) -> anyhow::Result<()> {
    println!("Validating trajectory: {}", input.display());

    let params = resolve_params(config, &args)?;
    let trajectory = load_trajectory(&input, params.fps, args.bodypart.as_deref())?;
    let clock = trajectory.clock();

    println!("  Frames: {}", trajectory.len());
    println!(
        "  Duration: {}",
        pawtrace_common::clock::FrameClock::format_timestamp(trajectory.duration_secs())
    );
    println!("  FPS: {}", clock.fps());
    println!("  Valid samples: {}", trajectory.valid_count());

    let (_, reports) = CleaningPipeline::standard().run(&trajectory, &params);
    for report in &reports {
        println!("  after {:<13} {}", report.stage, report.valid_after);
    }

    let remaining = reports.last().map_or(trajectory.valid_count(), |r| r.valid_after);
    if remaining == 0 {
        println!("\nNo input data: every sample is missing or rejected.");
    } else {
        println!("\nTrajectory is usable ({remaining} clean samples).");
    }

    Ok(())
}
