//! End-to-end analysis of one trajectory.

use pawtrace_common::error::{PawtraceError, PawtraceResult};
use pawtrace_model::context::{AnalysisContext, EventSummary};
use pawtrace_model::event::GrabEvent;
use pawtrace_model::metrics::KinematicMetrics;
use pawtrace_model::params::AnalysisParams;
use pawtrace_model::sample::Trajectory;

use crate::cleaning::CleaningPipeline;
use crate::detection::EventDetector;
use crate::interpolate::GapInterpolator;
use crate::metrics::MetricsComputer;
use crate::smoothing::TrajectorySmoother;

/// Run the full pipeline with the standard cleaning stages.
///
/// Invalid parameters are configuration errors and metrics that overflow are
/// processing errors. Empty or fully rejected input yields a context with no
/// events.
pub fn analyze(trajectory: &Trajectory, params: &AnalysisParams) -> PawtraceResult<AnalysisContext> {
    analyze_with(&CleaningPipeline::standard(), trajectory, params)
}

/// Run the full pipeline with a custom cleaning pipeline.
pub fn analyze_with(
    cleaning: &CleaningPipeline,
    trajectory: &Trajectory,
    params: &AnalysisParams,
) -> PawtraceResult<AnalysisContext> {
    params
        .validate()
        .map_err(|e| PawtraceError::config(e.to_string()))?;
    if (trajectory.fps() - params.fps).abs() > 1e-9 {
        return Err(PawtraceError::config(format!(
            "trajectory sampled at {} fps but parameters specify {} fps",
            trajectory.fps(),
            params.fps
        )));
    }

    let raw_valid = trajectory.valid_count();
    tracing::info!(
        frames = trajectory.len(),
        raw_valid,
        stages = ?cleaning.stage_names(),
        "analysis started"
    );

    let (cleaned, reports) = cleaning.run(trajectory, params);
    let filled = GapInterpolator::new().fill(&cleaned);
    let smoothed = TrajectorySmoother::from_params(params).smooth(&filled);

    let x_smooth = smoothed.xs();
    let y_smooth = smoothed.ys();
    let grab_events = EventDetector::from_params(params).detect(&x_smooth, &y_smooth);

    let computer = MetricsComputer::new(params.fps);
    let mut results = Vec::with_capacity(grab_events.len());
    let mut events = Vec::with_capacity(grab_events.len());
    let mut kept = Vec::with_capacity(grab_events.len());
    for event in grab_events {
        let Some(metrics) = measure(&computer, &event, &x_smooth, &y_smooth)? else {
            tracing::warn!(start = event.start_frame(), "event has no points; skipped");
            continue;
        };
        events.push(EventSummary {
            start_frame: event.start_frame(),
            end_frame: event.end_frame(),
            duration: metrics.duration,
            displacement: metrics.end_pos.0 - metrics.start_pos.0,
        });
        results.push(metrics);
        kept.push(event);
    }

    tracing::info!(events = kept.len(), "analysis complete");

    Ok(AnalysisContext {
        fps: params.fps,
        frame_count: trajectory.len(),
        raw_valid,
        cleaning: reports,
        speeds_smooth: derivative(&x_smooth, params.fps),
        accelerations_smooth: derivative(&derivative(&x_smooth, params.fps), params.fps),
        x_smooth,
        y_smooth,
        grab_events: kept,
        events,
        results,
    })
}

fn measure(
    computer: &MetricsComputer,
    event: &GrabEvent,
    xs: &[Option<f64>],
    ys: &[Option<f64>],
) -> PawtraceResult<Option<KinematicMetrics>> {
    match computer.compute(event, xs, ys) {
        Some(metrics) if !metrics.is_finite() => Err(PawtraceError::processing(format!(
            "non-finite metrics for event at frames {}..={}",
            event.start_frame(),
            event.end_frame()
        ))),
        other => Ok(other),
    }
}

/// Forward difference scaled by `fps`; missing when either side is missing.
pub fn derivative(values: &[Option<f64>], fps: f64) -> Vec<Option<f64>> {
    values
        .windows(2)
        .map(|w| Some((w[1]? - w[0]?) * fps))
        .collect()
}
