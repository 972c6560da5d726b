//! Chart-ready data derived from an analysis run.
//!
//! Rendering lives with the charting collaborator; this module only shapes
//! the numbers so they can be written as JSON next to the metrics table.

use serde::Serialize;

use pawtrace_common::clock::FrameClock;
use pawtrace_model::context::AnalysisContext;

/// File name used for chart data inside a results bundle.
pub const CHART_DATA_FILE: &str = "chart_data.json";

/// Fixed-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bin edges, one more than `counts`.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` with Sturges' rule (`ceil(log2 n) + 1` bins).
    ///
    /// Non-finite values are ignored. When all values are equal a single
    /// bin of width 1 centered on the value is used.
    pub fn sturges(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self {
                edges: vec![],
                counts: vec![],
            };
        }

        let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if hi - lo <= f64::EPSILON {
            return Self {
                edges: vec![lo - 0.5, lo + 0.5],
                counts: vec![finite.len()],
            };
        }

        let bins = (finite.len() as f64).log2().ceil() as usize + 1;
        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0; bins];
        for v in finite {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Self { edges, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Smoothed path of one event, for trajectory overlays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPath {
    /// 1-based event number, matching `trajectory_N.csv`.
    pub event: usize,
    pub points: Vec<(f64, f64)>,
}

/// Horizontal velocity over the whole recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocitySeries {
    pub time: Vec<f64>,
    pub velocity: Vec<Option<f64>>,
    /// `(start_time, end_time)` of each event, for shading.
    pub event_spans: Vec<(f64, f64)>,
}

/// Everything the standard figures need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub paths: Vec<EventPath>,
    pub velocity: VelocitySeries,
    pub lift_height: Histogram,
    pub average_speed: Histogram,
}

impl ChartData {
    pub fn from_context(context: &AnalysisContext) -> Self {
        let clock = FrameClock::new(context.fps);

        let paths = (0..context.grab_events.len())
            .map(|i| EventPath {
                event: i + 1,
                points: context.event_points(i),
            })
            .collect();

        // Velocity i is the step from frame i to frame i + 1.
        let velocity = VelocitySeries {
            time: (1..=context.speeds_smooth.len())
                .map(|f| clock.frame_to_secs(f))
                .collect(),
            velocity: context.speeds_smooth.clone(),
            event_spans: context
                .results
                .iter()
                .map(|m| (m.start_time, m.end_time))
                .collect(),
        };

        let lift: Vec<f64> = context.results.iter().map(|m| m.lift_height).collect();
        let speed: Vec<f64> = context.results.iter().map(|m| m.average_speed).collect();

        Self {
            paths,
            velocity,
            lift_height: Histogram::sturges(&lift),
            average_speed: Histogram::sturges(&speed),
        }
    }
}

/// Chart data access on a finished run.
pub trait ChartSource {
    fn chart_data(&self) -> ChartData;
}

impl ChartSource for AnalysisContext {
    fn chart_data(&self) -> ChartData {
        ChartData::from_context(self)
    }
}
