//! Detected reach-and-grab events.

use serde::{Deserialize, Serialize};

use pawtrace_common::clock::FrameClock;

/// One reach-and-grab interval, in frames.
///
/// Invariant: `start_frame <= peak_frame <= end_frame`. Fields are private so
/// an emitted event cannot be altered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrabEvent {
    start_frame: usize,
    peak_frame: usize,
    end_frame: usize,
}

impl GrabEvent {
    /// Create an event, returning `None` if the frames are out of order.
    pub fn new(start_frame: usize, peak_frame: usize, end_frame: usize) -> Option<Self> {
        (start_frame <= peak_frame && peak_frame <= end_frame).then_some(Self {
            start_frame,
            peak_frame,
            end_frame,
        })
    }

    pub fn start_frame(&self) -> usize {
        self.start_frame
    }

    pub fn peak_frame(&self) -> usize {
        self.peak_frame
    }

    pub fn end_frame(&self) -> usize {
        self.end_frame
    }

    /// Event duration in seconds.
    pub fn duration_secs(&self, clock: &FrameClock) -> f64 {
        clock.span_secs(self.start_frame, self.end_frame)
    }

    pub fn start_time(&self, clock: &FrameClock) -> f64 {
        clock.frame_to_secs(self.start_frame)
    }

    pub fn peak_time(&self, clock: &FrameClock) -> f64 {
        clock.frame_to_secs(self.peak_frame)
    }

    pub fn end_time(&self, clock: &FrameClock) -> f64 {
        clock.frame_to_secs(self.end_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unordered_frames() {
        assert!(GrabEvent::new(10, 5, 20).is_none());
        assert!(GrabEvent::new(10, 25, 20).is_none());
        assert!(GrabEvent::new(10, 10, 10).is_some());
    }

    #[test]
    fn test_derived_times() {
        let clock = FrameClock::new(120.0);
        let event = GrabEvent::new(60, 72, 84).unwrap();
        assert!((event.start_time(&clock) - 0.5).abs() < 1e-12);
        assert!((event.peak_time(&clock) - 0.6).abs() < 1e-12);
        assert!((event.duration_secs(&clock) - 0.2).abs() < 1e-12);
    }
}
