//! Tabular ingestion of keypoint tracks.
//!
//! Two comma-separated layouts are accepted:
//! - **Plain:** one header row naming `x`, `y`, and `likelihood` (or
//!   `confidence`); other columns are ignored.
//! - **Pose-estimator:** three header rows (`scorer`, `bodyparts`, `coords`)
//!   followed by an index column and one `x, y, likelihood` triplet per
//!   body part.
//!
//! Row order is frame order. Empty and `NaN` cells become missing values.
//!
//! Fields are split on every comma. Surrounding quotes are stripped, but a
//! comma inside a quoted field is not supported and shifts later columns.

use crate::sample::{InputError, Sample, Trajectory};

/// Header layout of a keypoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Plain,
    PoseEstimator,
}

/// Column positions of the three required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    x: usize,
    y: usize,
    confidence: usize,
}

impl Columns {
    fn width(&self) -> usize {
        self.x.max(self.y).max(self.confidence) + 1
    }
}

/// Detect the header layout from the first line.
pub fn detect_layout(text: &str) -> Option<TableLayout> {
    let first = text.lines().find(|l| !l.trim().is_empty())?;
    let lead = split_fields(first).first().map(|f| f.to_ascii_lowercase());
    match lead.as_deref() {
        Some("scorer") => Some(TableLayout::PoseEstimator),
        _ => Some(TableLayout::Plain),
    }
}

/// Parse a keypoint table into a trajectory.
///
/// `bodypart` selects a body part in the pose-estimator layout; the first
/// one is used when `None`. It is ignored for plain tables.
pub fn parse_table(text: &str, fps: f64, bodypart: Option<&str>) -> Result<Trajectory, InputError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let layout = detect_layout(text).ok_or(InputError::MissingHeader)?;
    let columns = match layout {
        TableLayout::Plain => {
            let (_, header) = lines.next().ok_or(InputError::MissingHeader)?;
            plain_columns(&split_fields(header))?
        }
        TableLayout::PoseEstimator => {
            let mut header = Vec::with_capacity(3);
            for _ in 0..3 {
                let (_, line) = lines.next().ok_or(InputError::MissingHeader)?;
                header.push(split_fields(line));
            }
            pose_columns(&header[1], &header[2], bodypart)?
        }
    };

    let mut samples = Vec::new();
    for (line_no, line) in lines {
        let row = line_no + 1;
        let fields = split_fields(line);
        if fields.len() < columns.width() {
            return Err(InputError::ShortRow {
                row,
                found: fields.len(),
                expected: columns.width(),
            });
        }

        samples.push(Sample {
            frame_index: samples.len(),
            x: parse_cell(&fields[columns.x], "x", row)?,
            y: parse_cell(&fields[columns.y], "y", row)?,
            confidence: parse_cell(&fields[columns.confidence], "likelihood", row)?,
        });
    }

    tracing::debug!(frames = samples.len(), ?layout, "parsed keypoint table");
    Trajectory::new(samples, fps)
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|f| f.trim().trim_matches('"').to_string())
        .collect()
}

fn plain_columns(header: &[String]) -> Result<Columns, InputError> {
    let find = |names: &[&str]| {
        header
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };

    let x = find(&["x"]).ok_or_else(|| missing("x"))?;
    let y = find(&["y"]).ok_or_else(|| missing("y"))?;
    let confidence = find(&["likelihood", "confidence"]).ok_or_else(|| missing("likelihood"))?;
    Ok(Columns { x, y, confidence })
}

fn pose_columns(
    bodyparts: &[String],
    coords: &[String],
    wanted: Option<&str>,
) -> Result<Columns, InputError> {
    if !bodyparts
        .first()
        .is_some_and(|f| f.eq_ignore_ascii_case("bodyparts"))
    {
        return Err(missing("bodyparts"));
    }
    if !coords
        .first()
        .is_some_and(|f| f.eq_ignore_ascii_case("coords"))
    {
        return Err(missing("coords"));
    }

    let name = match wanted {
        Some(name) => name.to_string(),
        None => bodyparts.get(1).cloned().ok_or_else(|| missing("x"))?,
    };

    let find = |coord: &str| {
        bodyparts
            .iter()
            .zip(coords)
            .skip(1)
            .position(|(part, c)| part == &name && c.eq_ignore_ascii_case(coord))
            .map(|i| i + 1)
    };

    if !bodyparts.iter().skip(1).any(|p| p == &name) {
        return Err(InputError::UnknownBodyPart { name });
    }

    Ok(Columns {
        x: find("x").ok_or_else(|| missing("x"))?,
        y: find("y").ok_or_else(|| missing("y"))?,
        confidence: find("likelihood").ok_or_else(|| missing("likelihood"))?,
    })
}

fn parse_cell(cell: &str, column: &str, row: usize) -> Result<Option<f64>, InputError> {
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(InputError::NonNumeric {
            row,
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}

fn missing(column: &str) -> InputError {
    InputError::MissingColumn {
        column: column.to_string(),
    }
}
