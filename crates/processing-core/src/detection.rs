//! Reach-and-grab event detection.
//!
//! A grab is a paw movement that starts in the start region, crosses into
//! the barrier region and comes back out. The detector scans the smoothed
//! trajectory once, driven by barrier *entries*:
//!
//! 1. **AtBarrier:** frame `i` is inside the barrier and `i - 1` is not.
//! 2. **EnteredStart:** look back (at most `max_back_time`, never into the
//!    previous event) for the most recent start-region frame.
//! 3. **Crossing:** walk back from that frame while the paw stays in the
//!    start region and keeps moving; the frame where motion began is the
//!    event start.
//! 4. **Returning:** look ahead (at most `max_forward_time`) for the first
//!    frame outside the barrier; that frame is the event end.
//! 5. **Emit** the event and resume scanning after its end, or **Abort**
//!    and keep scanning from the next frame. Between candidates the scan is
//!    **Idle**.
//!
//! Region membership is computed once into flat per-frame arrays; a missing
//! point is outside every region.

use pawtrace_common::clock::FrameClock;
use pawtrace_model::event::GrabEvent;
use pawtrace_model::params::AnalysisParams;
use pawtrace_model::region::Region;

/// Detector settings, with time windows already converted to frames.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub start_region: Region,
    pub barrier_region: Region,
    /// Look-back window from a barrier entry (frames).
    pub max_back_frames: usize,
    /// Look-ahead window from a barrier entry (frames).
    pub max_forward_frames: usize,
    /// Per-frame displacement at or below which the paw counts as resting.
    /// `None` uses the last start-region frame as the start.
    pub onset_rest_px: Option<f64>,
    /// Inclusive duration bounds in seconds, when enforced.
    pub duration_bounds: Option<(f64, f64)>,
    pub fps: f64,
}

impl DetectorConfig {
    /// Derive detector settings from run parameters.
    pub fn from_params(params: &AnalysisParams) -> Self {
        let clock = FrameClock::new(params.fps);
        Self {
            start_region: params.start_region,
            barrier_region: params.barrier_region,
            max_back_frames: clock.frames_in(params.max_back_time),
            max_forward_frames: clock.frames_in(params.max_forward_time),
            onset_rest_px: params.onset_rest_px,
            duration_bounds: params
                .enforce_duration_bounds
                .then_some((params.min_duration_sec, params.max_duration_sec)),
            fps: params.fps,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::from_params(&AnalysisParams::default())
    }
}

/// Phase a candidate event has reached. Between candidates the scan is
/// idle and holds no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Barrier entered at `entry`.
    AtBarrier { entry: usize },
    /// Last start-region frame before the entry found at `marker`.
    EnteredStart { entry: usize, marker: usize },
    /// Movement onset resolved to `start`.
    Crossing { start: usize, entry: usize },
    /// Barrier left (or window closed) at `end`.
    Returning { start: usize, end: usize },
}

/// Why a candidate was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// No start-region frame inside the look-back window.
    NoStartFrame,
    /// Duration outside the configured bounds.
    DurationOutOfBounds,
    /// Start, peak and end frames out of order.
    Unordered,
}

enum Step {
    Next(DetectorState),
    Emit(GrabEvent),
    Abort(AbortReason),
}

/// Scans a smoothed trajectory for grab events.
pub struct EventDetector {
    config: DetectorConfig,
}

impl EventDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn from_params(params: &AnalysisParams) -> Self {
        Self::new(DetectorConfig::from_params(params))
    }

    /// Detect events over parallel smoothed `x`/`y` series.
    ///
    /// Events are returned in increasing start order and never overlap.
    pub fn detect(&self, xs: &[Option<f64>], ys: &[Option<f64>]) -> Vec<GrabEvent> {
        let points: Vec<Option<(f64, f64)>> = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| Some(((*x)?, (*y)?)))
            .collect();
        let scan = Scan::new(&self.config, &points);

        let mut events = Vec::new();
        let mut floor = 0;
        let mut i = 0;
        while i < points.len() {
            if !scan.is_entry(i) {
                i += 1;
                continue;
            }

            match scan.run(i, floor) {
                Ok(event) => {
                    tracing::debug!(
                        start = event.start_frame(),
                        peak = event.peak_frame(),
                        end = event.end_frame(),
                        "grab event emitted"
                    );
                    floor = event.end_frame() + 1;
                    i = floor;
                    events.push(event);
                }
                Err(reason) => {
                    tracing::debug!(entry = i, ?reason, "grab candidate aborted");
                    i += 1;
                }
            }
        }
        events
    }
}

impl Default for EventDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

/// Membership arrays for one detection pass.
struct Scan<'a> {
    config: &'a DetectorConfig,
    points: &'a [Option<(f64, f64)>],
    in_start: Vec<bool>,
    in_barrier: Vec<bool>,
}

impl<'a> Scan<'a> {
    fn new(config: &'a DetectorConfig, points: &'a [Option<(f64, f64)>]) -> Self {
        let in_start = points
            .iter()
            .map(|p| config.start_region.contains_point(*p))
            .collect();
        let in_barrier = points
            .iter()
            .map(|p| config.barrier_region.contains_point(*p))
            .collect();
        Self {
            config,
            points,
            in_start,
            in_barrier,
        }
    }

    fn is_entry(&self, i: usize) -> bool {
        self.in_barrier[i] && !(i > 0 && self.in_barrier[i - 1])
    }

    /// Drive one candidate from its barrier entry to emit or abort.
    /// `floor` is the first frame not owned by an earlier event.
    fn run(&self, entry: usize, floor: usize) -> Result<GrabEvent, AbortReason> {
        let mut state = DetectorState::AtBarrier { entry };
        loop {
            match self.step(state, floor) {
                Step::Next(next) => state = next,
                Step::Emit(event) => return Ok(event),
                Step::Abort(reason) => return Err(reason),
            }
        }
    }

    fn step(&self, state: DetectorState, floor: usize) -> Step {
        match state {
            DetectorState::AtBarrier { entry } => {
                let lower = floor.max(entry.saturating_sub(self.config.max_back_frames));
                match (lower..entry).rev().find(|&k| self.in_start[k]) {
                    Some(marker) => Step::Next(DetectorState::EnteredStart { entry, marker }),
                    None => Step::Abort(AbortReason::NoStartFrame),
                }
            }
            DetectorState::EnteredStart { entry, marker } => {
                let lower = floor.max(entry.saturating_sub(self.config.max_back_frames));
                Step::Next(DetectorState::Crossing {
                    start: self.onset(marker, lower),
                    entry,
                })
            }
            DetectorState::Crossing { start, entry } => Step::Next(DetectorState::Returning {
                start,
                end: self.exit(entry),
            }),
            DetectorState::Returning { start, end } => {
                if let Some((min, max)) = self.config.duration_bounds {
                    let duration = FrameClock::new(self.config.fps).span_secs(start, end);
                    if duration < min || duration > max {
                        return Step::Abort(AbortReason::DurationOutOfBounds);
                    }
                }
                let peak = self.peak(start, end);
                match GrabEvent::new(start, peak, end) {
                    Some(event) => Step::Emit(event),
                    None => Step::Abort(AbortReason::Unordered),
                }
            }
        }
    }

    /// Walk back from the last start-region frame to where movement began.
    fn onset(&self, marker: usize, lower: usize) -> usize {
        let Some(rest) = self.config.onset_rest_px else {
            return marker;
        };
        let mut k = marker;
        while k > lower && self.in_start[k - 1] && self.displacement(k - 1, k) > rest {
            k -= 1;
        }
        k
    }

    /// First frame after the entry that is outside the barrier.
    fn exit(&self, entry: usize) -> usize {
        let last = self.points.len() - 1;
        let limit = (entry + self.config.max_forward_frames).min(last);
        for j in entry + 1..=limit {
            if self.points[j].is_none() {
                return j - 1;
            }
            if !self.in_barrier[j] {
                return j;
            }
        }
        limit
    }

    /// Highest paw position (smallest `y`), first occurrence on ties.
    fn peak(&self, start: usize, end: usize) -> usize {
        let mut best: Option<(usize, f64)> = None;
        for frame in start..=end {
            let Some((_, y)) = self.points[frame] else {
                continue;
            };
            if best.map_or(true, |(_, b)| y < b) {
                best = Some((frame, y));
            }
        }
        best.map_or(start, |(frame, _)| frame)
    }

    fn displacement(&self, a: usize, b: usize) -> f64 {
        match (self.points[a], self.points[b]) {
            (Some((xa, ya)), Some((xb, yb))) => (xb - xa).hypot(yb - ya),
            _ => 0.0,
        }
    }
}
