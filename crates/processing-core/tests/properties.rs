use proptest::prelude::*;

use pawtrace_model::params::AnalysisParams;
use pawtrace_model::sample::Trajectory;
use pawtrace_processing_core::cleaning::{CleaningPipeline, CleaningStage, ConfidenceFilter};
use pawtrace_processing_core::interpolate::fill_series;
use pawtrace_processing_core::smoothing::TrajectorySmoother;
use pawtrace_processing_core::{analyze, EventDetector};

/// Points scattered over the start and barrier regions.
fn arena_points() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((150.0..470.0f64, 240.0..470.0f64, 0.0..=1.0f64), 0..300)
}

/// A random walk, so consecutive frames stay close like a real paw.
fn walk() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-25.0..25.0f64, -20.0..20.0f64), 0..400).prop_map(|steps| {
        let mut pos = (250.0, 400.0);
        steps
            .into_iter()
            .map(|(dx, dy)| {
                pos = ((pos.0 + dx).clamp(150.0, 470.0), (pos.1 + dy).clamp(240.0, 470.0));
                pos
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn cleaning_never_restores_samples(points in arena_points()) {
        let traj = Trajectory::from_points(points, 120.0).unwrap();
        let (cleaned, reports) = CleaningPipeline::standard().run(&traj, &AnalysisParams::default());

        prop_assert_eq!(cleaned.len(), traj.len());
        let mut previous = traj.valid_count();
        for report in &reports {
            prop_assert!(report.valid_after <= previous);
            previous = report.valid_after;
        }
        for (before, after) in traj.samples().iter().zip(cleaned.samples()) {
            prop_assert!(before.is_valid() || !after.is_valid());
        }
    }

    #[test]
    fn raising_confidence_threshold_never_adds_samples(
        points in arena_points(),
        low in 0.0..=1.0f64,
        delta in 0.0..=1.0f64,
    ) {
        let high = (low + delta).min(1.0);
        let traj = Trajectory::from_points(points, 120.0).unwrap();
        let at = |threshold: f64| {
            let params = AnalysisParams { confidence_threshold: threshold, ..AnalysisParams::default() };
            ConfidenceFilter.apply(&traj, &params).valid_count()
        };
        prop_assert!(at(high) <= at(low));
    }

    #[test]
    fn events_are_ordered_and_disjoint(path in walk()) {
        let points = path.into_iter().map(|(x, y)| (x, y, 0.9));
        let traj = Trajectory::from_points(points, 120.0).unwrap();
        let ctx = analyze(&traj, &AnalysisParams::default()).unwrap();

        for pair in ctx.grab_events.windows(2) {
            prop_assert!(pair[0].end_frame() < pair[1].start_frame());
        }
        for event in &ctx.grab_events {
            prop_assert!(event.start_frame() <= event.peak_frame());
            prop_assert!(event.peak_frame() <= event.end_frame());
            prop_assert!(event.end_frame() < ctx.frame_count);
        }
        prop_assert_eq!(ctx.results.len(), ctx.grab_events.len());
    }

    #[test]
    fn detector_tolerates_gaps(path in walk(), holes in prop::collection::vec(any::<prop::sample::Index>(), 0..40)) {
        let mut xs: Vec<Option<f64>> = path.iter().map(|p| Some(p.0)).collect();
        let mut ys: Vec<Option<f64>> = path.iter().map(|p| Some(p.1)).collect();
        if !xs.is_empty() {
            for hole in holes {
                let i = hole.index(xs.len());
                xs[i] = None;
                ys[i] = None;
            }
        }
        let events = EventDetector::default().detect(&xs, &ys);
        for pair in events.windows(2) {
            prop_assert!(pair[0].end_frame() < pair[1].start_frame());
        }
        for event in &events {
            prop_assert!(xs[event.start_frame()].is_some());
            prop_assert!(ys[event.peak_frame()].is_some());
        }
    }

    #[test]
    fn constant_series_survives_smoothing(value in -1000.0..1000.0f64, len in 0usize..60) {
        let input = vec![Some(value); len];
        let out = TrajectorySmoother::default().smooth_series(&input);
        prop_assert_eq!(out.len(), len);
        for v in out {
            prop_assert!((v.unwrap() - value).abs() < 1e-9 * value.abs().max(1.0));
        }
    }

    #[test]
    fn interpolation_stays_between_anchors(
        values in prop::collection::vec(prop::option::of(-500.0..500.0f64), 0..100),
    ) {
        let filled = fill_series(&values);
        prop_assert_eq!(filled.len(), values.len());

        let first = values.iter().position(Option::is_some);
        let last = values.iter().rposition(Option::is_some);
        for (i, v) in filled.iter().enumerate() {
            match (first, last) {
                (Some(f), Some(l)) if i >= f && i <= l => {
                    let v = v.unwrap();
                    let prev = values[..=i].iter().rev().flatten().next().copied().unwrap();
                    let next = values[i..].iter().flatten().next().copied().unwrap();
                    prop_assert!(v >= prev.min(next) - 1e-9 && v <= prev.max(next) + 1e-9);
                }
                _ => prop_assert!(v.is_none()),
            }
        }
    }
}
