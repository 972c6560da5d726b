//! Frame clock utilities.
//!
//! Every PawTrace trajectory is sampled at a fixed frame rate, so time is
//! always derived from a frame index: `time = frame / fps`. This module
//! provides utilities for:
//! - Converting frames to seconds and back
//! - Sizing look-back/look-ahead windows in frames
//! - Formatting timestamps for reports
//! - Stamping analysis runs with wall-clock time

/// A fixed-rate clock mapping frame indices to seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: f64,
}

impl FrameClock {
    /// Create a clock for the given frame rate.
    ///
    /// Callers validate `fps > 0` before building a clock.
    pub fn new(fps: f64) -> Self {
        Self { fps }
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Seconds at the given frame index.
    pub fn frame_to_secs(&self, frame: usize) -> f64 {
        frame as f64 / self.fps
    }

    /// Seconds spanned between two frame indices.
    pub fn span_secs(&self, start: usize, end: usize) -> f64 {
        end.saturating_sub(start) as f64 / self.fps
    }

    /// Number of whole frames covered by a duration (rounded to nearest).
    pub fn frames_in(&self, secs: f64) -> usize {
        if secs <= 0.0 {
            return 0;
        }
        (secs * self.fps).round() as usize
    }

    /// Format seconds as `MM:SS.mmm`.
    pub fn format_timestamp(secs: f64) -> String {
        let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
        let minutes = total_ms / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let millis = total_ms % 1000;
        format!("{minutes:02}:{seconds:02}.{millis:03}")
    }
}

/// Wall-clock time of an analysis run (ISO 8601).
pub fn run_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
