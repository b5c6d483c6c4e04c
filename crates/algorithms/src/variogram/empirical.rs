//! Empirical semivariance and covariance per lag
//!
//! The semivariance γ(h) measures spatial dissimilarity as a function of
//! separation distance h:
//! ```text
//! γ(h) = (1/2N(h)) Σ [z(xᵢ) - z(xⱼ)]²   for all pairs with |xᵢ-xⱼ| ∈ [h-tol, h+tol)
//! ```
//! The covariance at the same lag is the mean-centred cross product of the
//! paired values:
//! ```text
//! C(h) = (1/N(h)) Σ z(xᵢ)·z(xⱼ) - m₋ₕ · m₊ₕ
//! ```
//! where m₋ₕ and m₊ₕ are the means of the tail (`i`) and head (`j`) values.
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Isaaks, E.H. & Srivastava, R.M. (1989). An Introduction to Applied Geostatistics.

use geokrig_core::{DistanceMatrix, Error, Result, SamplePoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lags::{anisotropic_lag_indices, lag_indices, Direction, LagPair};

/// Statistic computed for each lag bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statistic {
    /// Half the mean squared difference of paired values
    Semivariance,
    /// Mean-centred cross product of paired values
    Covariance,
}

/// Empirical curve: one statistic value per non-empty lag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalCurve {
    /// Which statistic `values` holds
    pub statistic: Statistic,
    /// Lag distances that had at least one pair, in request order
    pub lags: Vec<f64>,
    /// Statistic value at each lag
    pub values: Vec<f64>,
    /// Number of point pairs contributing to each lag
    pub pair_counts: Vec<usize>,
}

impl EmpiricalCurve {
    pub fn len(&self) -> usize {
        self.lags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }

    /// `(lag, value)` tuples in lag order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lags.iter().copied().zip(self.values.iter().copied())
    }
}

/// Semivariance of a lag pair set: mean of ½·(vᵢ − vⱼ)².
///
/// # Errors
/// [`Error::EmptyLag`] if `pairs` is empty.
pub fn semivariance(points: &[SamplePoint], pairs: &[LagPair]) -> Result<f64> {
    if pairs.is_empty() {
        return Err(Error::EmptyLag);
    }
    let sum_sq: f64 = pairs
        .iter()
        .map(|p| {
            let (vi, vj) = p.values(points);
            let dz = vi - vj;
            dz * dz
        })
        .sum();
    Ok(sum_sq / (2.0 * pairs.len() as f64))
}

/// Covariance of a lag pair set: mean(vᵢ·vⱼ) − mean(vᵢ)·mean(vⱼ).
///
/// # Errors
/// [`Error::EmptyLag`] if `pairs` is empty.
pub fn covariance(points: &[SamplePoint], pairs: &[LagPair]) -> Result<f64> {
    if pairs.is_empty() {
        return Err(Error::EmptyLag);
    }
    let n = pairs.len() as f64;
    let (mut sum_tail, mut sum_head, mut sum_cross) = (0.0, 0.0, 0.0);
    for p in pairs {
        let (vi, vj) = p.values(points);
        sum_tail += vi;
        sum_head += vj;
        sum_cross += vi * vj;
    }
    Ok(sum_cross / n - (sum_tail / n) * (sum_head / n))
}

fn statistic_of(points: &[SamplePoint], pairs: &[LagPair], statistic: Statistic) -> Result<f64> {
    match statistic {
        Statistic::Semivariance => semivariance(points, pairs),
        Statistic::Covariance => covariance(points, pairs),
    }
}

/// Compute the empirical curve over a sequence of lags.
///
/// Lags whose window holds no pair are dropped from the output rather than
/// failing the whole curve.
///
/// # Arguments
/// * `points` - Sample points with (x, y, value)
/// * `lags` - Lag distances, in the order they should appear
/// * `tol` - Half-width of every lag window
/// * `statistic` - Semivariance or covariance
pub fn empirical_curve(
    points: &[SamplePoint],
    lags: &[f64],
    tol: f64,
    statistic: Statistic,
) -> Result<EmpiricalCurve> {
    check_curve_inputs(points, lags, tol)?;
    let distances = DistanceMatrix::new(points)?;
    build_curve(points, lags, statistic, |lag| {
        Ok(lag_indices(&distances, lag, tol))
    })
}

/// Empirical curve restricted to pairs oriented along `direction`.
pub fn directional_curve(
    points: &[SamplePoint],
    lags: &[f64],
    tol: f64,
    statistic: Statistic,
    direction: Direction,
) -> Result<EmpiricalCurve> {
    check_curve_inputs(points, lags, tol)?;
    let distances = DistanceMatrix::new(points)?;
    build_curve(points, lags, statistic, |lag| {
        anisotropic_lag_indices(
            points,
            &distances,
            lag,
            tol,
            direction.angle,
            direction.tolerance,
        )
    })
}

/// Semivariogram shortcut for [`empirical_curve`]
pub fn semivariogram(points: &[SamplePoint], lags: &[f64], tol: f64) -> Result<EmpiricalCurve> {
    empirical_curve(points, lags, tol, Statistic::Semivariance)
}

/// Covariogram shortcut for [`empirical_curve`]
pub fn covariogram(points: &[SamplePoint], lags: &[f64], tol: f64) -> Result<EmpiricalCurve> {
    empirical_curve(points, lags, tol, Statistic::Covariance)
}

fn check_curve_inputs(points: &[SamplePoint], lags: &[f64], tol: f64) -> Result<()> {
    if points.len() < 2 {
        return Err(Error::InsufficientData {
            needed: 2,
            got: points.len(),
        });
    }
    if !(tol > 0.0) || !tol.is_finite() {
        return Err(Error::invalid_parameter("tol", tol, "must be finite and > 0"));
    }
    if let Some(bad) = lags.iter().find(|l| !l.is_finite()) {
        return Err(Error::invalid_parameter("lag", bad, "must be finite"));
    }
    Ok(())
}

fn build_curve<F>(
    points: &[SamplePoint],
    lags: &[f64],
    statistic: Statistic,
    mut pairs_at: F,
) -> Result<EmpiricalCurve>
where
    F: FnMut(f64) -> Result<Vec<LagPair>>,
{
    let mut curve = EmpiricalCurve {
        statistic,
        lags: Vec::with_capacity(lags.len()),
        values: Vec::with_capacity(lags.len()),
        pair_counts: Vec::with_capacity(lags.len()),
    };

    for &lag in lags {
        let pairs = pairs_at(lag)?;
        if pairs.is_empty() {
            debug!(lag, "dropping lag with no point pairs");
            continue;
        }
        let value = statistic_of(points, &pairs, statistic)?;
        curve.lags.push(lag);
        curve.values.push(value);
        curve.pair_counts.push(pairs.len());
    }

    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<SamplePoint> {
        vec![
            SamplePoint::new(0.0, 0.0, 1.0),
            SamplePoint::new(1.0, 0.0, 3.0),
            SamplePoint::new(0.0, 1.0, 3.0),
            SamplePoint::new(1.0, 1.0, 4.0),
        ]
    }

    #[test]
    fn test_semivariance_empty() {
        assert_eq!(semivariance(&square(), &[]), Err(Error::EmptyLag));
        assert_eq!(covariance(&square(), &[]), Err(Error::EmptyLag));
    }

    #[test]
    fn test_semivariance_value() {
        let pts = square();
        let pairs = [LagPair::new(0, 1), LagPair::new(2, 3)];
        // ((1-3)² + (3-4)²) / 4
        assert_relative_eq!(semivariance(&pts, &pairs).unwrap(), 1.25, epsilon = 1e-12);
    }

    #[test]
    fn test_semivariance_zero_iff_equal_values() {
        let pts = vec![
            SamplePoint::new(0.0, 0.0, 2.0),
            SamplePoint::new(1.0, 0.0, 2.0),
            SamplePoint::new(2.0, 0.0, 2.5),
        ];
        let same = [LagPair::new(0, 1)];
        let diff = [LagPair::new(0, 1), LagPair::new(1, 2)];
        assert_eq!(semivariance(&pts, &same).unwrap(), 0.0);
        assert!(semivariance(&pts, &diff).unwrap() > 0.0);
    }

    #[test]
    fn test_covariance_value() {
        let pts = square();
        let pairs = [LagPair::new(0, 1), LagPair::new(2, 3)];
        // tails (1, 3), heads (3, 4): mean(3, 12) - 2 * 3.5
        assert_relative_eq!(covariance(&pts, &pairs).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_covariance_single_pair_is_zero() {
        let pts = square();
        assert_relative_eq!(
            covariance(&pts, &[LagPair::new(0, 3)]).unwrap(),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_curve_drops_empty_lags() {
        let curve = semivariogram(&square(), &[0.5, 1.0, 1.5, 2.0], 0.5).unwrap();
        assert_eq!(curve.lags, vec![1.0, 1.5]);
        assert_eq!(curve.pair_counts, vec![6, 6]);
        for v in &curve.values {
            assert_relative_eq!(*v, 19.0 / 12.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_curve_all_empty() {
        let curve = covariogram(&square(), &[10.0, 20.0], 0.5).unwrap();
        assert!(curve.is_empty());
        assert_eq!(curve.statistic, Statistic::Covariance);
    }

    #[test]
    fn test_curve_rejects_bad_tolerance() {
        assert!(matches!(
            semivariogram(&square(), &[1.0], 0.0),
            Err(Error::InvalidParameter { name: "tol", .. })
        ));
    }

    #[test]
    fn test_curve_needs_two_points() {
        let pts = vec![SamplePoint::new(0.0, 0.0, 1.0)];
        assert!(matches!(
            semivariogram(&pts, &[1.0], 0.5),
            Err(Error::InsufficientData { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn test_directional_curve_splits_axes() {
        // Values change along x only, so the north-south semivariance is zero.
        let mut pts = Vec::new();
        for r in 0..4 {
            for c in 0..4 {
                pts.push(SamplePoint::new(c as f64, r as f64, c as f64 * 2.0));
            }
        }
        let ns = directional_curve(
            &pts,
            &[1.0, 2.0],
            0.25,
            Statistic::Semivariance,
            Direction::new(0.0, 10.0),
        )
        .unwrap();
        let ew = directional_curve(
            &pts,
            &[1.0, 2.0],
            0.25,
            Statistic::Semivariance,
            Direction::new(90.0, 10.0),
        )
        .unwrap();
        assert!(ns.values.iter().all(|v| *v == 0.0));
        assert_relative_eq!(ew.values[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(ew.values[1], 8.0, epsilon = 1e-12);
    }
}
