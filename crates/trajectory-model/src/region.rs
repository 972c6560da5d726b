//! Rectangular trigger regions in image coordinates.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle `(x0, x1, y0, y1)` in pixels.
///
/// Bounds are inclusive on all four edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge.
    pub x0: f64,
    /// Right edge.
    pub x1: f64,
    /// Top edge.
    pub y0: f64,
    /// Bottom edge.
    pub y1: f64,
}

impl Region {
    /// Create a region from `(x0, x1, y0, y1)`.
    pub const fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self { x0, x1, y0, y1 }
    }

    /// Default start region: where the paw rests before a reach.
    pub const START: Region = Region::new(200.0, 300.0, 350.0, 450.0);

    /// Default barrier region: the slot the paw reaches through.
    pub const BARRIER: Region = Region::new(330.0, 450.0, 250.0, 400.0);

    /// Default plausible tracking area (the arena frame).
    pub const ARENA: Region = Region::new(0.0, 500.0, 0.0, 500.0);

    /// Check if a point is within this region.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x0 && px <= self.x1 && py >= self.y0 && py <= self.y1
    }

    /// Check an optional point; missing points are never inside.
    pub fn contains_point(&self, point: Option<(f64, f64)>) -> bool {
        point.is_some_and(|(x, y)| self.contains(x, y))
    }

    /// Whether all bounds are finite and not inverted.
    pub fn is_well_formed(&self) -> bool {
        [self.x0, self.x1, self.y0, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x0 <= self.x1
            && self.y0 <= self.y1
    }
}
