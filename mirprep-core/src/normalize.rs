use std::convert::TryFrom;

use crate::error::PrepError;

/// How raw scores relate to prediction strength.
///
/// `Ascending` maps larger raw values to larger normalized values.
/// `Descending` inverts the scale, for scoring systems where smaller raw
/// values indicate stronger predictions, such as TargetScan context scores.
#[derive(Debug, Hash, Copy, Clone, Eq, PartialEq)]
pub enum ScoreOrientation {
    Ascending,
    Descending,
}

impl TryFrom<&str> for ScoreOrientation {
    type Error = PrepError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let orientation = match value {
            "asc" | "ascending" => ScoreOrientation::Ascending,
            "desc" | "descending" => ScoreOrientation::Descending,
            other => return Err(PrepError::Orientation(other.to_string())),
        };
        Ok(orientation)
    }
}

/// Min and max of a score column, or `None` for an empty column.
pub fn column_bounds(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter();
    let first = *iter.next()?;
    let mut min = first;
    let mut max = first;
    for &value in iter {
        if value < min {
            min = value;
        }
        if value > max {
            max = value;
        }
    }
    Some((min, max))
}

/// Rescales every value into [0, 1] against the column min and max.
///
/// A degenerate column (min == max) maps every value to the `x == min`
/// limit: 0.0 when ascending, 1.0 when descending.
pub fn normalize_scores(values: &[f64], orientation: ScoreOrientation) -> Vec<f64> {
    let (min, max) = match column_bounds(values) {
        Some(bounds) => bounds,
        None => return Vec::new(),
    };
    let range = max - min;

    values
        .iter()
        .map(|&value| {
            let ratio = if range == 0.0 {
                0.0
            } else {
                (value - min) / range
            };
            match orientation {
                ScoreOrientation::Ascending => ratio,
                ScoreOrientation::Descending => 1.0 - ratio,
            }
        })
        .collect()
}

/// Replaces the min/max rescaling with a caller-supplied scoring function.
pub fn normalize_scores_with<F>(values: &[f64], score: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    values.iter().map(|&value| score(value)).collect()
}
