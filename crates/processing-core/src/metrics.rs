//! Kinematic metrics for detected events.

use pawtrace_common::clock::FrameClock;
use pawtrace_model::event::GrabEvent;
use pawtrace_model::metrics::{Direction, KinematicMetrics, LegMetrics};

/// Computes per-event metrics from the smoothed trajectory.
#[derive(Debug, Clone, Copy)]
pub struct MetricsComputer {
    clock: FrameClock,
}

impl MetricsComputer {
    pub fn new(fps: f64) -> Self {
        Self {
            clock: FrameClock::new(fps),
        }
    }

    /// Metrics for one event over the smoothed slice `[start, end]`.
    ///
    /// Frames without a point are skipped. Returns `None` when the slice has
    /// no points at all.
    pub fn compute(
        &self,
        event: &GrabEvent,
        xs: &[Option<f64>],
        ys: &[Option<f64>],
    ) -> Option<KinematicMetrics> {
        let points: Vec<(f64, f64)> = (event.start_frame()..=event.end_frame())
            .filter_map(|f| Some((xs.get(f).copied().flatten()?, ys.get(f).copied().flatten()?)))
            .collect();
        let (&start_pos, &end_pos) = (points.first()?, points.last()?);

        let distance = (end_pos.0 - start_pos.0).abs();
        let duration = event.duration_secs(&self.clock);
        let average_speed = if duration > 0.0 { distance / duration } else { 0.0 };

        let y0 = start_pos.1;
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let lift_height = (min_y - y0).abs();
        let max_height = points
            .iter()
            .map(|p| (p.1 - y0).abs())
            .fold(0.0, f64::max);

        let leg = self.leg(&points, distance);
        let (left_to_right, right_to_left) = match Direction::of_travel(start_pos.0, end_pos.0) {
            Direction::LeftToRight => (leg, LegMetrics::default()),
            Direction::RightToLeft => (LegMetrics::default(), leg),
        };

        Some(KinematicMetrics {
            start_time: event.start_time(&self.clock),
            peak_time: event.peak_time(&self.clock),
            end_time: event.end_time(&self.clock),
            start_frame: event.start_frame(),
            peak_frame: event.peak_frame(),
            end_frame: event.end_frame(),
            trajectory_distance: distance,
            horizontal_displacement: distance,
            average_speed,
            lift_height,
            left_to_right,
            right_to_left,
            max_height,
            duration,
            start_pos,
            end_pos,
        })
    }

    fn leg(&self, points: &[(f64, f64)], distance: f64) -> LegMetrics {
        let fps = self.clock.fps();
        let speeds: Vec<f64> = points
            .windows(2)
            .map(|w| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1) * fps)
            .collect();
        let accelerations: Vec<f64> = speeds.windows(2).map(|w| (w[1] - w[0]) * fps).collect();

        LegMetrics {
            distance,
            speed: mean(&speeds),
            acceleration_mean: mean(&accelerations),
            acceleration_max: accelerations.iter().map(|a| a.abs()).fold(0.0, f64::max),
            smoothness: smoothness(&accelerations),
        }
    }
}

/// `-ln(mean(jerk²))` where jerk is the per-step change in acceleration.
///
/// Needs at least three accelerations; 0 when undefined or not finite.
pub fn smoothness(accelerations: &[f64]) -> f64 {
    if accelerations.len() < 3 {
        return 0.0;
    }
    let squared: Vec<f64> = accelerations
        .windows(2)
        .map(|w| (w[1] - w[0]).powi(2))
        .collect();
    let value = -mean(&squared).ln();
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
