//! The aggregated result of one analysis run.
//!
//! `AnalysisContext` is the only hand-off to export and charting
//! collaborators. It holds plain data and performs no I/O.

use serde::{Deserialize, Serialize};

use pawtrace_common::clock::FrameClock;

use crate::event::GrabEvent;
use crate::metrics::KinematicMetrics;

/// Valid-sample count after one cleaning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage name (e.g. "confidence").
    pub stage: String,
    /// Samples with both coordinates present after the stage ran.
    pub valid_after: usize,
}

/// Compact description of one event for overview plots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub start_frame: usize,
    pub end_frame: usize,
    /// Seconds between start and end.
    pub duration: f64,
    /// Signed horizontal displacement `x[end] - x[start]`.
    pub displacement: f64,
}

/// One row of a per-event trajectory slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRow {
    pub frame: usize,
    pub time: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// How a run ended, for user-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The input held no usable samples at all.
    NoInputData,
    /// Samples were present but no grab was detected.
    NoEvents,
    /// One or more grabs were detected.
    Events(usize),
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    /// Sampling rate of the analyzed trajectory.
    pub fps: f64,
    /// Number of frames in the input.
    pub frame_count: usize,
    /// Samples with both coordinates present before cleaning.
    pub raw_valid: usize,
    /// Valid counts after each cleaning stage, in run order.
    pub cleaning: Vec<StageReport>,
    /// Smoothed x series, one entry per frame.
    pub x_smooth: Vec<Option<f64>>,
    /// Smoothed y series, one entry per frame.
    pub y_smooth: Vec<Option<f64>>,
    /// Horizontal velocity `Δx × fps` (one shorter than the series).
    pub speeds_smooth: Vec<Option<f64>>,
    /// Horizontal acceleration `Δ²x × fps²` (two shorter than the series).
    pub accelerations_smooth: Vec<Option<f64>>,
    /// Detected events in temporal order.
    pub grab_events: Vec<GrabEvent>,
    /// Overview summaries, parallel to `grab_events`.
    pub events: Vec<EventSummary>,
    /// Full metrics, parallel to `grab_events`.
    pub results: Vec<KinematicMetrics>,
}

impl AnalysisContext {
    /// Classify the run for reporting.
    pub fn outcome(&self) -> RunOutcome {
        if self.frame_count == 0 || self.raw_valid == 0 {
            RunOutcome::NoInputData
        } else if self.results.is_empty() {
            RunOutcome::NoEvents
        } else {
            RunOutcome::Events(self.results.len())
        }
    }

    /// Smoothed rows `[start_frame, end_frame]` of the `index`-th event.
    pub fn event_trajectory(&self, index: usize) -> Option<Vec<TrajectoryRow>> {
        let event = self.grab_events.get(index)?;
        let clock = FrameClock::new(self.fps);
        Some(
            (event.start_frame()..=event.end_frame())
                .map(|frame| TrajectoryRow {
                    frame,
                    time: clock.frame_to_secs(frame),
                    x: self.x_smooth.get(frame).copied().flatten(),
                    y: self.y_smooth.get(frame).copied().flatten(),
                })
                .collect(),
        )
    }

    /// Smoothed `(x, y)` points of the `index`-th event, skipping gaps.
    pub fn event_points(&self, index: usize) -> Vec<(f64, f64)> {
        self.event_trajectory(index)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|row| Some((row.x?, row.y?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with(x: Vec<Option<f64>>, events: Vec<GrabEvent>) -> AnalysisContext {
        let n = x.len();
        let valid = x.iter().filter(|v| v.is_some()).count();
        AnalysisContext {
            fps: 10.0,
            frame_count: n,
            raw_valid: valid,
            cleaning: vec![StageReport {
                stage: "confidence".to_string(),
                valid_after: valid,
            }],
            y_smooth: x.clone(),
            x_smooth: x,
            speeds_smooth: vec![],
            accelerations_smooth: vec![],
            grab_events: events,
            events: vec![],
            results: vec![],
        }
    }

    #[test]
    fn test_outcome_no_input() {
        let ctx = context_with(vec![None, None], vec![]);
        assert_eq!(ctx.outcome(), RunOutcome::NoInputData);
    }

    #[test]
    fn test_outcome_no_events() {
        let ctx = context_with(vec![Some(1.0), Some(2.0)], vec![]);
        assert_eq!(ctx.outcome(), RunOutcome::NoEvents);
    }

    #[test]
    fn test_event_trajectory_slice() {
        let x = (0..10).map(|i| Some(i as f64)).collect();
        let ctx = context_with(x, vec![GrabEvent::new(2, 3, 4).unwrap()]);

        let rows = ctx.event_trajectory(0).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].frame, 2);
        assert!((rows[2].time - 0.4).abs() < 1e-12);
        assert_eq!(rows[2].x, Some(4.0));
        assert!(ctx.event_trajectory(1).is_none());
        assert_eq!(ctx.event_points(0).len(), 3);
    }
}
