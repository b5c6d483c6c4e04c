//! Lag binning of point pairs
//!
//! A lag window around distance `lag` with half-width `tol` is the half-open
//! interval `[lag - tol, lag + tol)`. Adjoining windows (`lag + 2·tol` as the
//! next lag) therefore partition distances without overlap: a pair exactly on
//! a boundary belongs to the upper window.

use geokrig_core::{DistanceMatrix, Error, Result, SamplePoint};
use serde::{Deserialize, Serialize};

use super::bearing::{bearing, in_angle_sector, normalize_degrees};

/// Unordered pair of point indices, stored with `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LagPair {
    pub i: usize,
    pub j: usize,
}

impl LagPair {
    pub fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { i, j }
        } else {
            Self { i: j, j: i }
        }
    }

    /// Measured values of the two points, `(value_i, value_j)`.
    #[inline]
    pub fn values(&self, points: &[SamplePoint]) -> (f64, f64) {
        (points[self.i].value, points[self.j].value)
    }
}

/// Angular sector for directional (anisotropic) analysis.
///
/// `angle` is a compass bearing (0 = north, clockwise) and `tolerance` the
/// half-width of the sector in degrees. Directions are undirected lines: the
/// reciprocal sector `angle + 180` is always included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub angle: f64,
    pub tolerance: f64,
}

impl Direction {
    pub fn new(angle: f64, tolerance: f64) -> Self {
        Self { angle, tolerance }
    }

    /// True if `theta` lies in this sector or its reciprocal.
    pub fn contains(&self, theta: f64) -> bool {
        let angle = normalize_degrees(self.angle);
        in_angle_sector(theta, angle, self.tolerance)
            || in_angle_sector(theta, normalize_degrees(angle + 180.0), self.tolerance)
    }
}

/// All point pairs whose distance falls in `[lag - tol, lag + tol)`.
///
/// Scans the upper triangle of the matrix row by row, so the output order is
/// deterministic: ascending `i`, then ascending `j`.
pub fn lag_indices(distances: &DistanceMatrix, lag: f64, tol: f64) -> Vec<LagPair> {
    let lo = lag - tol;
    let hi = lag + tol;
    let n = distances.len();
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let d = distances.get(i, j);
            if d >= lo && d < hi {
                pairs.push(LagPair { i, j });
            }
        }
    }
    pairs
}

/// Lag pairs further restricted to a bearing sector and its reciprocal.
///
/// Keeps the row-major order of [`lag_indices`]; a pair is kept once even
/// when the two sectors overlap.
///
/// # Errors
/// [`Error::InvalidInput`] if `points` and `distances` disagree in size, and
/// [`Error::InvalidParameter`] for a non-finite angle or negative tolerance.
pub fn anisotropic_lag_indices(
    points: &[SamplePoint],
    distances: &DistanceMatrix,
    lag: f64,
    tol: f64,
    angle: f64,
    angle_tol: f64,
) -> Result<Vec<LagPair>> {
    if points.len() != distances.len() {
        return Err(Error::InvalidInput(format!(
            "{} points but distance matrix is {}x{}",
            points.len(),
            distances.len(),
            distances.len()
        )));
    }
    if !angle.is_finite() {
        return Err(Error::invalid_parameter("angle", angle, "must be finite"));
    }
    if !(angle_tol >= 0.0) {
        return Err(Error::invalid_parameter(
            "angle_tol",
            angle_tol,
            "must be non-negative",
        ));
    }

    let direction = Direction::new(angle, angle_tol);
    Ok(lag_indices(distances, lag, tol)
        .into_iter()
        .filter(|p| direction.contains(bearing(points[p.i].xy(), points[p.j].xy())))
        .collect())
}
