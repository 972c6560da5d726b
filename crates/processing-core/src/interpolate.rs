//! Gap filling by linear interpolation.

use pawtrace_model::sample::{Sample, Trajectory};

/// Fills interior gaps of each axis from the surrounding valid samples.
///
/// Leading and trailing gaps have only one anchor and are left missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapInterpolator;

impl GapInterpolator {
    pub fn new() -> Self {
        Self
    }

    /// Interpolate x and y independently. Confidence is left untouched.
    pub fn fill(&self, trajectory: &Trajectory) -> Trajectory {
        let xs = fill_series(&trajectory.xs());
        let ys = fill_series(&trajectory.ys());

        let samples = trajectory
            .samples()
            .iter()
            .zip(xs.into_iter().zip(ys))
            .map(|(s, (x, y))| Sample { x, y, ..*s })
            .collect();
        trajectory.with_samples(samples)
    }
}

/// Linearly interpolate interior `None` runs of a series.
pub fn fill_series(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = values.to_vec();
    let mut anchor: Option<(usize, f64)> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(v1) = *value else {
            continue;
        };
        if let Some((i0, v0)) = anchor {
            let span = (i - i0) as f64;
            for (k, slot) in out.iter_mut().enumerate().take(i).skip(i0 + 1) {
                let t = (k - i0) as f64 / span;
                *slot = Some(v0 + (v1 - v0) * t);
            }
        }
        anchor = Some((i, v1));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_interior_run() {
        let filled = fill_series(&[Some(0.0), None, None, None, Some(4.0)]);
        assert_eq!(
            filled,
            vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn test_leaves_edges_missing() {
        let filled = fill_series(&[None, Some(1.0), None, Some(3.0), None]);
        assert_eq!(filled, vec![None, Some(1.0), Some(2.0), Some(3.0), None]);
    }

    #[test]
    fn test_all_missing_stays_missing() {
        assert_eq!(fill_series(&[None, None]), vec![None, None]);
        assert!(fill_series(&[]).is_empty());
    }

    #[test]
    fn test_fill_trajectory_axes_independently() {
        let samples = vec![
            Sample::new(0, 0.0, 10.0, 0.9),
            Sample {
                frame_index: 1,
                x: None,
                y: Some(12.0),
                confidence: Some(0.1),
            },
            Sample::new(2, 4.0, 14.0, 0.9),
        ];
        let t = Trajectory::new(samples, 120.0).unwrap();
        let out = GapInterpolator::new().fill(&t);

        assert_eq!(out.point(1), Some((2.0, 12.0)));
        assert_eq!(out.samples()[1].confidence, Some(0.1));
    }
}
