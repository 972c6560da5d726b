//! Per-event kinematic metrics and the metrics table schema.

use serde::{Deserialize, Serialize};

/// Column order of the persisted metrics table.
pub const METRICS_COLUMNS: [&str; 26] = [
    "start_time",
    "peak_time",
    "end_time",
    "start_frame",
    "peak_frame",
    "end_frame",
    "trajectory_distance",
    "horizontal_displacement",
    "average_speed",
    "lift_height",
    "left_to_right_distance",
    "left_to_right_speed",
    "left_to_right_acceleration_mean",
    "left_to_right_acceleration_max",
    "left_to_right_smoothness",
    "right_to_left_distance",
    "right_to_left_speed",
    "right_to_left_acceleration_mean",
    "right_to_left_acceleration_max",
    "right_to_left_smoothness",
    "max_height",
    "duration",
    "start_pos_x",
    "start_pos_y",
    "end_pos_x",
    "end_pos_y",
];

/// Horizontal direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

impl Direction {
    /// Direction of net travel from `x_start` to `x_end`.
    ///
    /// No net movement counts as left-to-right.
    pub fn of_travel(x_start: f64, x_end: f64) -> Self {
        if x_end >= x_start {
            Self::LeftToRight
        } else {
            Self::RightToLeft
        }
    }
}

/// Motion statistics of one directional leg.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LegMetrics {
    /// Net horizontal distance (pixels).
    pub distance: f64,
    /// Mean per-frame speed (pixels/second).
    pub speed: f64,
    /// Mean acceleration (pixels/second²).
    pub acceleration_mean: f64,
    /// Largest absolute acceleration (pixels/second²).
    pub acceleration_max: f64,
    /// Negative log of the mean squared jerk; 0 when undefined.
    pub smoothness: f64,
}

/// Kinematic summary of one grab event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicMetrics {
    pub start_time: f64,
    pub peak_time: f64,
    pub end_time: f64,
    pub start_frame: usize,
    pub peak_frame: usize,
    pub end_frame: usize,
    pub trajectory_distance: f64,
    pub horizontal_displacement: f64,
    pub average_speed: f64,
    pub lift_height: f64,
    pub left_to_right: LegMetrics,
    pub right_to_left: LegMetrics,
    pub max_height: f64,
    pub duration: f64,
    pub start_pos: (f64, f64),
    pub end_pos: (f64, f64),
}

impl KinematicMetrics {
    /// Values in `METRICS_COLUMNS` order.
    pub fn to_row(&self) -> Vec<String> {
        let leg = |l: &LegMetrics| {
            [
                l.distance,
                l.speed,
                l.acceleration_mean,
                l.acceleration_max,
                l.smoothness,
            ]
        };

        let mut row = vec![
            fmt_float(self.start_time),
            fmt_float(self.peak_time),
            fmt_float(self.end_time),
            self.start_frame.to_string(),
            self.peak_frame.to_string(),
            self.end_frame.to_string(),
            fmt_float(self.trajectory_distance),
            fmt_float(self.horizontal_displacement),
            fmt_float(self.average_speed),
            fmt_float(self.lift_height),
        ];
        row.extend(leg(&self.left_to_right).into_iter().map(fmt_float));
        row.extend(leg(&self.right_to_left).into_iter().map(fmt_float));
        row.extend(
            [
                self.max_height,
                self.duration,
                self.start_pos.0,
                self.start_pos.1,
                self.end_pos.0,
                self.end_pos.1,
            ]
            .into_iter()
            .map(fmt_float),
        );
        row
    }

    /// Whether every real-valued field is finite.
    pub fn is_finite(&self) -> bool {
        let legs = [self.left_to_right, self.right_to_left];
        [
            self.start_time,
            self.peak_time,
            self.end_time,
            self.trajectory_distance,
            self.horizontal_displacement,
            self.average_speed,
            self.lift_height,
            self.max_height,
            self.duration,
            self.start_pos.0,
            self.start_pos.1,
            self.end_pos.0,
            self.end_pos.1,
        ]
        .into_iter()
        .chain(legs.iter().flat_map(|l| {
            [
                l.distance,
                l.speed,
                l.acceleration_mean,
                l.acceleration_max,
                l.smoothness,
            ]
        }))
        .all(f64::is_finite)
    }
}

/// Render the metrics table as comma-separated text with a header row.
///
/// An empty slice still yields the full header.
pub fn metrics_table(metrics: &[KinematicMetrics]) -> String {
    let mut out = METRICS_COLUMNS.join(",");
    out.push('\n');
    for m in metrics {
        out.push_str(&m.to_row().join(","));
        out.push('\n');
    }
    out
}

fn fmt_float(value: f64) -> String {
    format!("{value:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> KinematicMetrics {
        KinematicMetrics {
            start_time: 0.4,
            peak_time: 0.5,
            end_time: 0.6,
            start_frame: 48,
            peak_frame: 60,
            end_frame: 72,
            trajectory_distance: 120.0,
            horizontal_displacement: 120.0,
            average_speed: 600.0,
            lift_height: 80.0,
            left_to_right: LegMetrics {
                distance: 120.0,
                speed: 700.0,
                acceleration_mean: 10.0,
                acceleration_max: 5000.0,
                smoothness: -12.5,
            },
            right_to_left: LegMetrics::default(),
            max_height: 80.0,
            duration: 0.2,
            start_pos: (200.0, 400.0),
            end_pos: (320.0, 390.0),
        }
    }

    #[test]
    fn test_row_matches_schema_width() {
        assert_eq!(sample_metrics().to_row().len(), METRICS_COLUMNS.len());
    }

    #[test]
    fn test_row_field_positions() {
        let row = sample_metrics().to_row();
        assert_eq!(row[3], "48");
        assert_eq!(row[5], "72");
        assert_eq!(row[10], "120.000000");
        assert_eq!(row[15], "0.000000");
        assert_eq!(row[25], "390.000000");
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let table = metrics_table(&[]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].split(',').count(), 26);
        assert!(lines[0].starts_with("start_time,peak_time,end_time"));
    }

    #[test]
    fn test_is_finite() {
        let mut m = sample_metrics();
        assert!(m.is_finite());
        m.right_to_left.acceleration_max = f64::INFINITY;
        assert!(!m.is_finite());
    }

    #[test]
    fn test_direction_of_travel() {
        assert_eq!(Direction::of_travel(1.0, 2.0), Direction::LeftToRight);
        assert_eq!(Direction::of_travel(2.0, 2.0), Direction::LeftToRight);
        assert_eq!(Direction::of_travel(2.0, 1.0), Direction::RightToLeft);
    }
}
