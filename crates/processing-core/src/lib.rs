//! PawTrace Processing Core
//!
//! Turns a raw keypoint trajectory into grab events and their kinematics:
//! - **Cleaning:** Null out low-confidence, implausible and too-fast samples
//! - **Interpolation:** Close interior gaps linearly
//! - **Smoothing:** Savitzky-Golay filtering per contiguous run
//! - **Detection:** Region state machine over the smoothed path
//! - **Metrics:** Per-event distances, speeds, heights and smoothness
//!
//! This crate is pure computation: no I/O, no global state.
//! All inputs are data; all outputs are data.

pub mod charts;
pub mod cleaning;
pub mod detection;
pub mod interpolate;
pub mod metrics;
pub mod pipeline;
pub mod smoothing;

pub use charts::{ChartData, ChartSource, Histogram};
pub use cleaning::{CleaningPipeline, CleaningStage};
pub use detection::{DetectorConfig, EventDetector};
pub use interpolate::GapInterpolator;
pub use metrics::MetricsComputer;
pub use pipeline::{analyze, analyze_with};
pub use smoothing::TrajectorySmoother;
