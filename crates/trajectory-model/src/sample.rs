//! Per-frame keypoint samples and the trajectory that owns them.
//!
//! A trajectory holds exactly one sample per frame for the whole clip.
//! Pipeline stages null out coordinates; they never add or remove frames.

use serde::{Deserialize, Serialize};

use pawtrace_common::clock::FrameClock;
use pawtrace_common::error::PawtraceError;

/// A single frame's keypoint observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Zero-based frame index.
    pub frame_index: usize,
    /// Horizontal image coordinate (pixels), `None` when missing or rejected.
    pub x: Option<f64>,
    /// Vertical image coordinate (pixels, increasing downward).
    pub y: Option<f64>,
    /// Pose-estimator confidence in `[0.0, 1.0]`.
    pub confidence: Option<f64>,
}

impl Sample {
    /// Create a fully observed sample.
    pub fn new(frame_index: usize, x: f64, y: f64, confidence: f64) -> Self {
        Self {
            frame_index,
            x: Some(x),
            y: Some(y),
            confidence: Some(confidence),
        }
    }

    /// Create a sample with no usable observation.
    pub fn missing(frame_index: usize) -> Self {
        Self {
            frame_index,
            x: None,
            y: None,
            confidence: None,
        }
    }

    /// Position if both coordinates are present.
    pub fn point(&self) -> Option<(f64, f64)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    }

    /// Whether both coordinates are present.
    pub fn is_valid(&self) -> bool {
        self.point().is_some()
    }

    /// Copy of this sample with its coordinates nulled.
    ///
    /// Confidence is preserved for diagnostics.
    pub fn nulled(&self) -> Self {
        Self {
            x: None,
            y: None,
            ..*self
        }
    }
}

/// An ordered, dense sequence of samples at a fixed frame rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    fps: f64,
    samples: Vec<Sample>,
}

impl Trajectory {
    /// Build a trajectory, validating the sampling contract.
    ///
    /// Frame indices must be `0, 1, 2, ...` in order and `fps` must be a
    /// positive finite number.
    pub fn new(samples: Vec<Sample>, fps: f64) -> Result<Self, InputError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(InputError::InvalidFps { fps });
        }

        for (expected, sample) in samples.iter().enumerate() {
            if sample.frame_index != expected {
                return Err(InputError::NonDenseFrames {
                    expected,
                    found: sample.frame_index,
                });
            }
            if let Some(c) = sample.confidence {
                if !(0.0..=1.0).contains(&c) {
                    return Err(InputError::ConfidenceOutOfRange {
                        frame: expected,
                        value: c,
                    });
                }
            }
        }

        Ok(Self { fps, samples })
    }

    /// Build a trajectory from `(x, y, confidence)` rows, one per frame.
    pub fn from_points(
        points: impl IntoIterator<Item = (f64, f64, f64)>,
        fps: f64,
    ) -> Result<Self, InputError> {
        let samples = points
            .into_iter()
            .enumerate()
            .map(|(i, (x, y, c))| Sample::new(i, x, y, c))
            .collect();
        Self::new(samples, fps)
    }

    /// Copy of this trajectory with a replacement sample set.
    ///
    /// Used by pipeline stages; the replacement must keep one sample per
    /// frame, which every stage guarantees by mapping sample-for-sample.
    pub fn with_samples(&self, samples: Vec<Sample>) -> Self {
        debug_assert_eq!(samples.len(), self.samples.len());
        Self {
            fps: self.fps,
            samples,
        }
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Clock for this trajectory's frame rate.
    pub fn clock(&self) -> FrameClock {
        FrameClock::new(self.fps)
    }

    /// All samples in frame order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the trajectory has no frames.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples with both coordinates present.
    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_valid()).count()
    }

    /// Position at a frame, if present.
    pub fn point(&self, frame: usize) -> Option<(f64, f64)> {
        self.samples.get(frame).and_then(Sample::point)
    }

    /// The x series, one entry per frame.
    pub fn xs(&self) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.x).collect()
    }

    /// The y series, one entry per frame.
    pub fn ys(&self) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.y).collect()
    }

    /// Duration covered by the clip in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.fps
    }
}

impl From<InputError> for PawtraceError {
    fn from(err: InputError) -> Self {
        PawtraceError::input(err.to_string())
    }
}

/// Malformed input that prevents the pipeline from running.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Frame rate must be positive and finite, got {fps}")]
    InvalidFps { fps: f64 },

    #[error("Frame indices must be dense and zero-based: expected {expected}, found {found}")]
    NonDenseFrames { expected: usize, found: usize },

    #[error("Confidence at frame {frame} is outside [0, 1]: {value}")]
    ConfidenceOutOfRange { frame: usize, value: f64 },

    #[error("Missing required column `{column}`")]
    MissingColumn { column: String },

    #[error("Non-numeric value {value:?} in column `{column}` at row {row}")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row} has {found} fields, expected at least {expected}")]
    ShortRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Body part `{name}` not found in table header")]
    UnknownBodyPart { name: String },

    #[error("Table has no header")]
    MissingHeader,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_assigns_dense_frames() {
        let traj = Trajectory::from_points(vec![(1.0, 2.0, 0.9), (3.0, 4.0, 0.8)], 120.0).unwrap();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.samples()[1].frame_index, 1);
        assert_eq!(traj.point(1), Some((3.0, 4.0)));
        assert_eq!(traj.valid_count(), 2);
    }

    #[test]
    fn test_rejects_gap_in_frames() {
        let samples = vec![Sample::new(0, 0.0, 0.0, 1.0), Sample::new(2, 0.0, 0.0, 1.0)];
        let err = Trajectory::new(samples, 120.0).unwrap_err();
        assert_eq!(
            err,
            InputError::NonDenseFrames {
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn test_rejects_bad_fps() {
        assert!(matches!(
            Trajectory::new(vec![], 0.0),
            Err(InputError::InvalidFps { .. })
        ));
        assert!(matches!(
            Trajectory::new(vec![], f64::NAN),
            Err(InputError::InvalidFps { .. })
        ));
    }

    #[test]
    fn test_rejects_confidence_out_of_range() {
        let samples = vec![Sample::new(0, 0.0, 0.0, 1.5)];
        assert!(matches!(
            Trajectory::new(samples, 30.0),
            Err(InputError::ConfidenceOutOfRange { frame: 0, .. })
        ));
    }

    #[test]
    fn test_input_errors_convert_to_caller_errors() {
        let err = PawtraceError::from(InputError::InvalidFps { fps: 0.0 });
        assert!(err.is_caller_error());
        assert!(matches!(err, PawtraceError::Input { .. }));
        assert!(err.to_string().starts_with("Input error: Frame rate"));
    }

    #[test]
    fn test_empty_trajectory_is_valid() {
        let traj = Trajectory::new(vec![], 120.0).unwrap();
        assert!(traj.is_empty());
        assert_eq!(traj.valid_count(), 0);
    }

    #[test]
    fn test_nulled_preserves_confidence() {
        let s = Sample::new(3, 10.0, 20.0, 0.4).nulled();
        assert!(!s.is_valid());
        assert_eq!(s.confidence, Some(0.4));
        assert_eq!(s.frame_index, 3);
    }

    #[test]
    fn test_point_requires_both_coordinates() {
        let s = Sample {
            frame_index: 0,
            x: Some(1.0),
            y: None,
            confidence: Some(1.0),
        };
        assert_eq!(s.point(), None);
    }
}
