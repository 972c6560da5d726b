//! PawTrace Trajectory Model
//!
//! Defines the core data contracts for reach-and-grab analysis:
//! - **Samples:** Per-frame `(x, y, confidence)` keypoint observations
//! - **Regions:** Axis-aligned trigger rectangles in image coordinates
//! - **Params:** The immutable parameter set of one analysis run
//! - **Events & Metrics:** Detected grab intervals and their kinematics
//! - **Context:** The aggregated hand-off to export and charting
//! - **Table / Bundle:** Tabular ingestion and on-disk results layout
//!
//! Coordinates are image pixels with `y` increasing downward, so a smaller
//! `y` means the limb is lifted higher.

pub mod bundle;
pub mod context;
pub mod event;
pub mod metrics;
pub mod params;
pub mod region;
pub mod sample;
pub mod table;

pub use bundle::*;
pub use context::*;
pub use event::*;
pub use metrics::*;
pub use params::*;
pub use region::*;
pub use sample::*;
pub use table::*;
