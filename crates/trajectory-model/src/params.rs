//! The parameter set of one analysis run.
//!
//! Parameters travel through the pipeline as a single immutable value, so
//! concurrent runs with different settings never interfere.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::region::Region;

/// All tunable values of the cleaning, smoothing, and detection stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Sampling rate of the trajectory (frames per second).
    pub fps: f64,

    /// Samples with confidence below this value are discarded.
    pub confidence_threshold: f64,

    /// Coordinates outside this region are treated as tracking failures.
    pub plausible_region: Region,

    /// Maximum jump (pixels) from the previous kept sample.
    pub extreme_dist: f64,

    /// Maximum plausible speed, in pixels per frame.
    pub speed_threshold: f64,

    /// Shortest accepted event (seconds), when bounds are enforced.
    pub min_duration_sec: f64,

    /// Longest accepted event (seconds), when bounds are enforced.
    pub max_duration_sec: f64,

    /// Whether detected events outside the duration bounds are dropped.
    pub enforce_duration_bounds: bool,

    /// Where the paw rests before reaching.
    pub start_region: Region,

    /// The slot the paw reaches through.
    pub barrier_region: Region,

    /// How far back from a barrier entry to look for the start region (seconds).
    pub max_back_time: f64,

    /// How far forward from a barrier entry to look for the exit (seconds).
    pub max_forward_time: f64,

    /// Savitzky-Golay window length (odd).
    pub smoothing_window: usize,

    /// Savitzky-Golay polynomial order.
    pub smoothing_polyorder: usize,

    /// Per-frame displacement (pixels) at or below which the paw counts as
    /// resting when locating the reach onset. `None` keeps the most recent
    /// start-region frame as the event start.
    pub onset_rest_px: Option<f64>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            fps: 120.0,
            confidence_threshold: 0.6,
            plausible_region: Region::ARENA,
            extreme_dist: 200.0,
            speed_threshold: 100.0,
            min_duration_sec: 0.5,
            max_duration_sec: 1.0,
            enforce_duration_bounds: false,
            start_region: Region::START,
            barrier_region: Region::BARRIER,
            max_back_time: 0.5,
            max_forward_time: 0.2,
            smoothing_window: 7,
            smoothing_polyorder: 2,
            onset_rest_px: Some(2.0),
        }
    }
}

impl AnalysisParams {
    /// Speed limit in pixels per second.
    pub fn max_speed_px_per_sec(&self) -> f64 {
        self.speed_threshold * self.fps
    }

    /// Check every value for consistency.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(ParamsError::invalid("fps", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ParamsError::invalid(
                "confidence_threshold",
                "must be within [0, 1]",
            ));
        }
        if !(self.extreme_dist.is_finite() && self.extreme_dist > 0.0) {
            return Err(ParamsError::invalid("extreme_dist", "must be positive"));
        }
        if !(self.speed_threshold.is_finite() && self.speed_threshold > 0.0) {
            return Err(ParamsError::invalid("speed_threshold", "must be positive"));
        }
        if self.min_duration_sec < 0.0 || self.max_duration_sec < self.min_duration_sec {
            return Err(ParamsError::invalid(
                "min_duration_sec/max_duration_sec",
                "must satisfy 0 <= min <= max",
            ));
        }
        if self.max_back_time < 0.0 || self.max_forward_time < 0.0 {
            return Err(ParamsError::invalid(
                "max_back_time/max_forward_time",
                "must not be negative",
            ));
        }
        for (name, region) in [
            ("plausible_region", &self.plausible_region),
            ("start_region", &self.start_region),
            ("barrier_region", &self.barrier_region),
        ] {
            if !region.is_well_formed() {
                return Err(ParamsError::invalid(name, "bounds are inverted or not finite"));
            }
        }
        if self.smoothing_window % 2 == 0 {
            return Err(ParamsError::invalid("smoothing_window", "must be odd"));
        }
        if self.smoothing_polyorder >= self.smoothing_window {
            return Err(ParamsError::invalid(
                "smoothing_polyorder",
                "must be less than smoothing_window",
            ));
        }
        if let Some(rest) = self.onset_rest_px {
            if !(rest.is_finite() && rest >= 0.0) {
                return Err(ParamsError::invalid("onset_rest_px", "must not be negative"));
            }
        }
        Ok(())
    }

    /// Load parameters from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ParamsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let params: Self = serde_json::from_str(&content).map_err(|e| ParamsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Save parameters to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ParamsError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ParamsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ParamsError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors raised by invalid or unreadable parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid parameter `{field}`: {reason}")]
    Invalid { field: String, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },
}

impl ParamsError {
    fn invalid(field: &str, reason: &str) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        AnalysisParams::default().validate().unwrap();
    }

    #[test]
    fn test_speed_limit_scales_with_fps() {
        let params = AnalysisParams {
            fps: 60.0,
            ..AnalysisParams::default()
        };
        assert!((params.max_speed_px_per_sec() - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_even_window_rejected() {
        let params = AnalysisParams {
            smoothing_window: 6,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("smoothing_window"));
    }

    #[test]
    fn test_polyorder_must_fit_window() {
        let params = AnalysisParams {
            smoothing_window: 3,
            smoothing_polyorder: 3,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_inverted_region_rejected() {
        let params = AnalysisParams {
            barrier_region: Region::new(450.0, 330.0, 250.0, 400.0),
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("barrier_region"));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let params = AnalysisParams {
            confidence_threshold: 1.2,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let parsed: AnalysisParams =
            serde_json::from_str(r#"{"fps": 60.0, "onset_rest_px": null}"#).unwrap();
        assert_eq!(parsed.fps, 60.0);
        assert_eq!(parsed.onset_rest_px, None);
        assert_eq!(parsed.smoothing_window, 7);
        assert_eq!(parsed.start_region, Region::START);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("pawtrace_test_params");
        let _ = std::fs::remove_dir_all(&dir);

        let path = dir.join("params.json");
        let params = AnalysisParams {
            confidence_threshold: 0.9,
            ..Default::default()
        };
        params.save(&path).unwrap();

        let loaded = AnalysisParams::load(&path).unwrap();
        assert_eq!(loaded, params);

        std::fs::remove_dir_all(&dir).ok();
    }
}
