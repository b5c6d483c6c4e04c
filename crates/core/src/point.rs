//! Sampled locations and dataset-level helpers
//!
//! A dataset is an ordered slice of [`SamplePoint`]s. The position of a point
//! in that slice is its identity: lag pairs, neighbor sets and kriging weights
//! all refer back to points by index.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A sample point with x, y coordinates and a measured value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Build a point from a numeric row laid out as `x, y, value[, ...]`.
    ///
    /// Extra columns are ignored. Rows with fewer than three columns are
    /// rejected with [`Error::InvalidInput`].
    pub fn from_row(row: &[f64]) -> Result<Self> {
        match row {
            [x, y, value, ..] => Ok(Self::new(*x, *y, *value)),
            _ => Err(Error::InvalidInput(format!(
                "point row needs x, y and value columns, got {} column(s)",
                row.len()
            ))),
        }
    }

    /// Location as an `(x, y)` tuple
    #[inline]
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Squared Euclidean distance to another location
    #[inline]
    pub fn dist_sq(&self, other_x: f64, other_y: f64) -> f64 {
        let dx = self.x - other_x;
        let dy = self.y - other_y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another location
    #[inline]
    pub fn dist(&self, other_x: f64, other_y: f64) -> f64 {
        self.dist_sq(other_x, other_y).sqrt()
    }
}

/// Convert numeric rows into sample points, validating each one.
pub fn points_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Vec<SamplePoint>> {
    let points = rows
        .iter()
        .map(|r| SamplePoint::from_row(r.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    validate_points(&points)?;
    Ok(points)
}

/// Reject datasets with non-finite coordinates or values.
pub fn validate_points(points: &[SamplePoint]) -> Result<()> {
    for (i, p) in points.iter().enumerate() {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(Error::InvalidInput(format!(
                "point {} has non-finite coordinates ({}, {})",
                i, p.x, p.y
            )));
        }
        if !p.value.is_finite() {
            return Err(Error::InvalidInput(format!(
                "point {} has non-finite value {}",
                i, p.value
            )));
        }
    }
    Ok(())
}

/// Arithmetic mean of the measured values. Returns `None` for an empty dataset.
pub fn mean_value(points: &[SamplePoint]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64)
}

/// Population variance (divisor `n`) of the measured values.
///
/// This is the sill estimate used when fitting a model straight from data.
pub fn population_variance(points: &[SamplePoint]) -> Option<f64> {
    let mean = mean_value(points)?;
    let ss = points
        .iter()
        .map(|p| {
            let d = p.value - mean;
            d * d
        })
        .sum::<f64>();
    Some(ss / points.len() as f64)
}
