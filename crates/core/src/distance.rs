//! Pairwise Euclidean distances between sample points
//!
//! The matrix is dense and computed exhaustively: building it is O(N²) in
//! time and memory. That is fine for the few-thousand-point datasets this
//! library targets; beyond 10,000 points a warning is logged since both
//! runtime and memory grow quadratically.

use ndarray::{Array2, ArrayView2};
use tracing::warn;

use crate::error::{Error, Result};
use crate::point::{validate_points, SamplePoint};

/// Dataset size above which building a distance matrix logs a warning.
pub const LARGE_DATASET_WARNING: usize = 10_000;

/// Square, symmetric matrix of distances between every pair of points.
///
/// Entry `(i, j)` is the distance between point `i` and point `j`; the
/// diagonal is zero. The matrix is never patched after construction: when
/// the dataset changes, build a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Array2<f64>,
}

impl DistanceMatrix {
    /// Compute the distance matrix of a dataset.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] if any point has non-finite coordinates or value.
    pub fn new(points: &[SamplePoint]) -> Result<Self> {
        validate_points(points)?;
        let coords: Vec<(f64, f64)> = points.iter().map(SamplePoint::xy).collect();
        Ok(Self::from_xy(&coords))
    }

    /// Compute the distance matrix from numeric rows whose first two columns
    /// are the x and y coordinates.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] if a row has fewer than two columns or a
    /// non-finite coordinate.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let mut coords = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            match row.as_ref() {
                [x, y, ..] if x.is_finite() && y.is_finite() => coords.push((*x, *y)),
                [_, _, ..] => {
                    return Err(Error::InvalidInput(format!(
                        "row {} has non-finite coordinates",
                        i
                    )))
                }
                short => {
                    return Err(Error::InvalidInput(format!(
                        "row {} needs at least 2 coordinate columns, got {}",
                        i,
                        short.len()
                    )))
                }
            }
        }
        Ok(Self::from_xy(&coords))
    }

    fn from_xy(coords: &[(f64, f64)]) -> Self {
        let n = coords.len();
        if n > LARGE_DATASET_WARNING {
            warn!(
                points = n,
                "building a dense {}x{} distance matrix, this is O(N^2)", n, n
            );
        }

        let mut data = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            let (xi, yi) = coords[i];
            for j in (i + 1)..n {
                let (xj, yj) = coords[j];
                let d = (xi - xj).hypot(yi - yj);
                data[(i, j)] = d;
                data[(j, i)] = d;
            }
        }
        Self { data }
    }

    /// Number of points (rows and columns)
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Distance between point `i` and point `j`. Panics if out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[(i, j)]
    }

    /// Read-only view of the underlying matrix
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Largest pairwise distance, 0 for fewer than two points.
    pub fn max_distance(&self) -> f64 {
        self.data.iter().copied().fold(0.0_f64, f64::max)
    }
}

/// Distances from a query location to every point of a dataset.
pub fn distances_to(points: &[SamplePoint], x: f64, y: f64) -> Vec<f64> {
    points.iter().map(|p| (p.x - x).hypot(p.y - y)).collect()
}
