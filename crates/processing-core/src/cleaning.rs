//! Trajectory cleaning: null out samples that cannot be trusted.
//!
//! Stages run in a fixed order and each one sees the previous stage's
//! output, so a sample rejected early is absent (not a position) for every
//! later stage. Stages never drop frames.
//!
//! Default order:
//! 1. **Confidence:** reject samples the pose estimator was unsure about.
//! 2. **Position:** reject coordinates outside the plausible arena.
//! 3. **Extreme jump:** reject teleports from the previous kept sample.
//! 4. **Speed:** reject physically implausible speeds, accounting for gaps.

use pawtrace_model::context::StageReport;
use pawtrace_model::params::AnalysisParams;
use pawtrace_model::sample::{Sample, Trajectory};

/// One cleaning transformation.
pub trait CleaningStage: Send + Sync {
    /// Short stage name used in reports and logs.
    fn name(&self) -> &'static str;

    /// Return a copy of `trajectory` with rejected samples nulled.
    fn apply(&self, trajectory: &Trajectory, params: &AnalysisParams) -> Trajectory;
}

/// Null coordinates whose confidence is below `confidence_threshold`.
///
/// A sample without a confidence value is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceFilter;

impl CleaningStage for ConfidenceFilter {
    fn name(&self) -> &'static str {
        "confidence"
    }

    fn apply(&self, trajectory: &Trajectory, params: &AnalysisParams) -> Trajectory {
        let samples = trajectory
            .samples()
            .iter()
            .map(|s| match s.confidence {
                Some(c) if c >= params.confidence_threshold => *s,
                _ => s.nulled(),
            })
            .collect();
        trajectory.with_samples(samples)
    }
}

/// Null samples outside `plausible_region`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionFilter;

impl CleaningStage for PositionFilter {
    fn name(&self) -> &'static str {
        "position"
    }

    fn apply(&self, trajectory: &Trajectory, params: &AnalysisParams) -> Trajectory {
        let samples = trajectory
            .samples()
            .iter()
            .map(|s| {
                if params.plausible_region.contains_point(s.point()) {
                    *s
                } else {
                    s.nulled()
                }
            })
            .collect();
        trajectory.with_samples(samples)
    }
}

/// Null samples that jump more than `extreme_dist` from the previous kept
/// sample.
///
/// The first valid sample is kept unconditionally and becomes the anchor.
/// If that sample is itself a glitch, every later sample farther than
/// `extreme_dist` from it is rejected, which can empty the whole clip. The
/// position filter ahead of this stage removes anchors outside the arena;
/// a glitch inside the arena is not detected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtremeJumpFilter;

impl CleaningStage for ExtremeJumpFilter {
    fn name(&self) -> &'static str {
        "extreme_jump"
    }

    fn apply(&self, trajectory: &Trajectory, params: &AnalysisParams) -> Trajectory {
        let samples = walk_kept(trajectory.samples(), |prev, _gap, dist| {
            prev.is_none() || dist <= params.extreme_dist
        });
        trajectory.with_samples(samples)
    }
}

/// Null samples whose speed from the previous kept sample exceeds
/// `speed_threshold` pixels per frame.
///
/// Speed is `distance × fps / frame_gap`, so samples separated by earlier
/// rejections are judged over the real elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedFilter;

impl CleaningStage for SpeedFilter {
    fn name(&self) -> &'static str {
        "speed"
    }

    fn apply(&self, trajectory: &Trajectory, params: &AnalysisParams) -> Trajectory {
        let fps = trajectory.fps();
        let limit = params.max_speed_px_per_sec();
        let samples = walk_kept(trajectory.samples(), |prev, gap, dist| {
            prev.is_none() || dist * fps / gap as f64 <= limit
        });
        trajectory.with_samples(samples)
    }
}

/// Walk left to right comparing each valid sample to the previous *kept*
/// valid sample. `keep(prev, frame_gap, distance)` decides; rejected samples
/// are nulled and never become the anchor.
fn walk_kept<F>(samples: &[Sample], keep: F) -> Vec<Sample>
where
    F: Fn(Option<(f64, f64)>, usize, f64) -> bool,
{
    let mut anchor: Option<(usize, f64, f64)> = None;
    samples
        .iter()
        .map(|s| {
            let Some((x, y)) = s.point() else {
                return *s;
            };
            let (prev, gap, dist) = match anchor {
                Some((frame, px, py)) => (
                    Some((px, py)),
                    s.frame_index.saturating_sub(frame).max(1),
                    (x - px).hypot(y - py),
                ),
                None => (None, 1, 0.0),
            };

            if keep(prev, gap, dist) {
                anchor = Some((s.frame_index, x, y));
                *s
            } else {
                s.nulled()
            }
        })
        .collect()
}

/// An ordered list of cleaning stages.
pub struct CleaningPipeline {
    stages: Vec<Box<dyn CleaningStage>>,
}

impl CleaningPipeline {
    /// The standard four-stage pipeline.
    pub fn standard() -> Self {
        Self::with_stages(vec![
            Box::new(ConfidenceFilter),
            Box::new(PositionFilter),
            Box::new(ExtremeJumpFilter),
            Box::new(SpeedFilter),
        ])
    }

    /// A pipeline with a custom stage order.
    pub fn with_stages(stages: Vec<Box<dyn CleaningStage>>) -> Self {
        Self { stages }
    }

    /// Stage names in run order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order, reporting the valid count after each.
    pub fn run(
        &self,
        trajectory: &Trajectory,
        params: &AnalysisParams,
    ) -> (Trajectory, Vec<StageReport>) {
        let mut current = trajectory.clone();
        let mut reports = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            current = stage.apply(&current, params);
            let valid_after = current.valid_count();
            tracing::info!(stage = stage.name(), valid_after, "cleaning stage complete");
            reports.push(StageReport {
                stage: stage.name().to_string(),
                valid_after,
            });
        }

        (current, reports)
    }
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawtrace_model::region::Region;

    fn traj(points: &[(f64, f64, f64)]) -> Trajectory {
        Trajectory::from_points(points.iter().copied(), 120.0).unwrap()
    }

    #[test]
    fn test_confidence_filter_keeps_confidence() {
        let t = traj(&[(1.0, 1.0, 0.9), (2.0, 2.0, 0.3)]);
        let out = ConfidenceFilter.apply(&t, &AnalysisParams::default());
        assert!(out.samples()[0].is_valid());
        assert!(!out.samples()[1].is_valid());
        assert_eq!(out.samples()[1].confidence, Some(0.3));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_confidence_at_threshold_is_kept() {
        let t = traj(&[(1.0, 1.0, 0.6)]);
        let out = ConfidenceFilter.apply(&t, &AnalysisParams::default());
        assert!(out.samples()[0].is_valid());
    }

    #[test]
    fn test_missing_confidence_rejected() {
        let t = Trajectory::new(
            vec![Sample {
                frame_index: 0,
                x: Some(1.0),
                y: Some(1.0),
                confidence: None,
            }],
            120.0,
        )
        .unwrap();
        let out = ConfidenceFilter.apply(&t, &AnalysisParams::default());
        assert_eq!(out.valid_count(), 0);
    }

    #[test]
    fn test_position_filter() {
        let t = traj(&[(250.0, 250.0, 1.0), (-5.0, 250.0, 1.0), (250.0, 900.0, 1.0)]);
        let params = AnalysisParams {
            plausible_region: Region::new(0.0, 500.0, 0.0, 500.0),
            ..Default::default()
        };
        let out = PositionFilter.apply(&t, &params);
        assert_eq!(out.valid_count(), 1);
    }

    #[test]
    fn test_extreme_jump_does_not_anchor_on_rejected() {
        // Frame 1 teleports; frame 2 is back near frame 0 and must be kept
        // because it is compared to frame 0, not to the rejected frame 1.
        let t = traj(&[(100.0, 100.0, 1.0), (400.0, 400.0, 1.0), (105.0, 100.0, 1.0)]);
        let out = ExtremeJumpFilter.apply(&t, &AnalysisParams::default());
        assert!(out.samples()[0].is_valid());
        assert!(!out.samples()[1].is_valid());
        assert!(out.samples()[2].is_valid());
    }

    #[test]
    fn test_extreme_jump_trusts_first_sample() {
        let mut points = vec![(10.0, 10.0, 1.0)];
        points.extend((1..240).map(|_| (250.0, 400.0, 1.0)));
        let out = ExtremeJumpFilter.apply(&traj(&points), &AnalysisParams::default());
        assert_eq!(out.valid_count(), 1);
        assert!(out.samples()[0].is_valid());
    }

    #[test]
    fn test_extreme_jump_skips_leading_nulls() {
        let samples = vec![
            Sample::missing(0),
            Sample::new(1, 100.0, 100.0, 1.0),
            Sample::new(2, 110.0, 100.0, 1.0),
        ];
        let t = Trajectory::new(samples, 120.0).unwrap();
        let out = ExtremeJumpFilter.apply(&t, &AnalysisParams::default());
        assert_eq!(out.valid_count(), 2);
    }

    #[test]
    fn test_speed_filter_uses_frame_gap() {
        // 150 px over 2 frames is 75 px/frame: under the 100 px/frame limit.
        let samples = vec![
            Sample::new(0, 100.0, 100.0, 1.0),
            Sample::missing(1),
            Sample::new(2, 250.0, 100.0, 1.0),
        ];
        let t = Trajectory::new(samples, 120.0).unwrap();
        let out = SpeedFilter.apply(&t, &AnalysisParams::default());
        assert!(out.samples()[2].is_valid());

        // The same displacement in a single frame is too fast.
        let t = traj(&[(100.0, 100.0, 1.0), (250.0, 100.0, 1.0)]);
        let out = SpeedFilter.apply(&t, &AnalysisParams::default());
        assert!(!out.samples()[1].is_valid());
    }

    #[test]
    fn test_pipeline_reports_monotonic_counts() {
        let t = traj(&[
            (100.0, 100.0, 0.9),
            (101.0, 100.0, 0.2),
            (900.0, 100.0, 0.9),
            (102.0, 100.0, 0.9),
            (350.0, 100.0, 0.9),
        ]);
        let (out, reports) = CleaningPipeline::standard().run(&t, &AnalysisParams::default());

        assert_eq!(out.len(), t.len());
        assert_eq!(reports.len(), 4);
        assert_eq!(
            reports.iter().map(|r| r.stage.as_str()).collect::<Vec<_>>(),
            vec!["confidence", "position", "extreme_jump", "speed"]
        );
        assert!(reports.windows(2).all(|w| w[1].valid_after <= w[0].valid_after));
        assert_eq!(reports[0].valid_after, 4);
        assert_eq!(reports[1].valid_after, 3);
        assert_eq!(reports[2].valid_after, 2);
    }

    #[test]
    fn test_custom_stage_order() {
        let pipeline =
            CleaningPipeline::with_stages(vec![Box::new(SpeedFilter), Box::new(ConfidenceFilter)]);
        assert_eq!(pipeline.stage_names(), vec!["speed", "confidence"]);
    }

    #[test]
    fn test_all_null_input_stays_null() {
        let samples = (0..5).map(Sample::missing).collect();
        let t = Trajectory::new(samples, 120.0).unwrap();
        let (out, reports) = CleaningPipeline::standard().run(&t, &AnalysisParams::default());
        assert_eq!(out.valid_count(), 0);
        assert!(reports.iter().all(|r| r.valid_after == 0));
    }
}
