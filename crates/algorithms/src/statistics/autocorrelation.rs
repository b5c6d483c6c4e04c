//! Spatial autocorrelation for scattered points
//!
//! **Global Moran's I** with inverse-distance weights:
//! ```text
//! wᵢⱼ = 1 / dᵢⱼ  (i ≠ j),  row-standardised so Σⱼ wᵢⱼ = 1
//! I   = (n / S₀) · Σᵢⱼ wᵢⱼ (zᵢ − z̄)(zⱼ − z̄) / Σᵢ (zᵢ − z̄)²
//! ```
//! The z-score uses the variance of I under the normality assumption.
//!
//! Reference:
//! Moran, P.A.P. (1950). Notes on continuous stochastic phenomena. Biometrika.
//! Cliff, A.D. & Ord, J.K. (1981). Spatial Processes. Pion.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use geokrig_core::{mean_value, DistanceMatrix, Error, Result, SamplePoint};

/// Result of Global Moran's I computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoransIResult {
    /// Moran's I statistic
    pub i: f64,
    /// Expected I under no autocorrelation, −1/(n−1)
    pub expected: f64,
    /// Z-score under the normality assumption
    pub z_score: f64,
    /// Two-tailed p-value
    pub p_value: f64,
}

/// Compute Global Moran's I for a set of sample points.
///
/// # Errors
/// - [`Error::InsufficientData`] for fewer than 3 points
/// - [`Error::InvalidInput`] if two points share a location (infinite weight)
pub fn morans_i(points: &[SamplePoint]) -> Result<MoransIResult> {
    let n = points.len();
    if n < 3 {
        return Err(Error::InsufficientData { needed: 3, got: n });
    }

    let distances = DistanceMatrix::new(points)?;
    let mut weights = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let d = distances.get(i, j);
            if d == 0.0 {
                return Err(Error::InvalidInput(format!(
                    "points {} and {} are coincident, inverse-distance weight is infinite",
                    i, j
                )));
            }
            weights[(i, j)] = 1.0 / d;
        }
    }

    // Row standardisation
    for mut row in weights.rows_mut() {
        let total = row.sum();
        if total > 0.0 {
            row /= total;
        }
    }

    let nf = n as f64;
    let expected = -1.0 / (nf - 1.0);
    let mean = mean_value(points).unwrap_or(0.0);
    let dev: Vec<f64> = points.iter().map(|p| p.value - mean).collect();
    let sum_sq: f64 = dev.iter().map(|d| d * d).sum();

    if sum_sq.abs() < f64::EPSILON {
        return Ok(MoransIResult {
            i: 0.0,
            expected,
            z_score: 0.0,
            p_value: 1.0,
        });
    }

    let mut numerator = 0.0;
    for ((i, j), w) in weights.indexed_iter() {
        numerator += w * dev[i] * dev[j];
    }
    let s0 = weights.sum();
    let morans_i = (nf / s0) * (numerator / sum_sq);

    // S₁ = ½ Σᵢⱼ (wᵢⱼ + wⱼᵢ)²,  S₂ = Σᵢ (wᵢ. + w.ᵢ)²
    let mut s1 = 0.0;
    for i in 0..n {
        for j in 0..n {
            let w = weights[(i, j)] + weights[(j, i)];
            s1 += w * w;
        }
    }
    s1 /= 2.0;
    let row_sums = weights.sum_axis(ndarray::Axis(1));
    let col_sums = weights.sum_axis(ndarray::Axis(0));
    let s2: f64 = row_sums
        .iter()
        .zip(col_sums.iter())
        .map(|(r, c)| (r + c) * (r + c))
        .sum();

    let var_i = (nf * nf * s1 - nf * s2 + 3.0 * s0 * s0) / ((nf * nf - 1.0) * s0 * s0)
        - expected * expected;
    let z_score = if var_i > 0.0 {
        (morans_i - expected) / var_i.sqrt()
    } else {
        0.0
    };
    let p_value = 2.0 * normal_cdf(-z_score.abs());

    Ok(MoransIResult {
        i: morans_i,
        expected,
        z_score,
        p_value,
    })
}

/// Standard normal CDF (Abramowitz & Stegun 26.2.17, |error| < 7.5e-8)
fn normal_cdf(x: f64) -> f64 {
    if x < -8.0 {
        return 0.0;
    }
    if x > 8.0 {
        return 1.0;
    }
    let t = 1.0 / (1.0 + 0.2316419 * x.abs());
    let density = (-x * x / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let poly = t * (0.319381530
        + t * (-0.356563782 + t * (1.781477937 + t * (-1.821255978 + t * 1.330274429))));
    let tail = density * poly;
    if x > 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(values: impl Fn(usize, usize) -> f64) -> Vec<SamplePoint> {
        let mut pts = Vec::new();
        for r in 0..6 {
            for c in 0..6 {
                pts.push(SamplePoint::new(c as f64, r as f64, values(r, c)));
            }
        }
        pts
    }

    #[test]
    fn test_clustered_is_positive() {
        let pts = grid(|_, c| if c < 3 { 10.0 } else { 0.0 });
        let res = morans_i(&pts).unwrap();
        assert!(res.i > res.expected, "I = {}", res.i);
        assert!(res.z_score > 2.0);
        assert!(res.p_value < 0.05);
    }

    #[test]
    fn test_checkerboard_is_negative() {
        let pts = grid(|r, c| if (r + c) % 2 == 0 { 1.0 } else { -1.0 });
        let res = morans_i(&pts).unwrap();
        assert!(res.i < res.expected, "I = {}", res.i);
        assert!(res.z_score < 0.0);
    }

    #[test]
    fn test_constant_values() {
        let pts = grid(|_, _| 5.0);
        let res = morans_i(&pts).unwrap();
        assert_eq!(res.i, 0.0);
        assert_eq!(res.p_value, 1.0);
        assert_relative_eq!(res.expected, -1.0 / 35.0, epsilon = 1e-12);
    }

    #[test]
    fn test_too_few_points() {
        let pts = vec![SamplePoint::new(0.0, 0.0, 1.0), SamplePoint::new(1.0, 0.0, 2.0)];
        assert!(matches!(
            morans_i(&pts),
            Err(Error::InsufficientData { needed: 3, got: 2 })
        ));
    }

    #[test]
    fn test_coincident_points() {
        let pts = vec![
            SamplePoint::new(0.0, 0.0, 1.0),
            SamplePoint::new(0.0, 0.0, 2.0),
            SamplePoint::new(1.0, 0.0, 3.0),
        ];
        assert!(matches!(morans_i(&pts), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_normal_cdf() {
        assert_relative_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-7);
        assert_relative_eq!(normal_cdf(1.96), 0.9750021, epsilon = 1e-6);
        assert_relative_eq!(normal_cdf(-1.96), 0.0249979, epsilon = 1e-6);
    }
}
