//! Range fitting by exhaustive grid search
//!
//! The sill is fixed by the caller (usually the population variance of the
//! data) and only the range parameter `a` is searched. Candidates are spread
//! uniformly over `[lags[1], lags[last]]` of the empirical curve and the one
//! with the lowest mean squared error against the curve wins. The error
//! surface over `a` is generally not convex, so no local optimizer is used.

use ndarray::{Array, ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};
use tracing::debug;

use geokrig_core::{population_variance, Error, Result, SamplePoint};

use super::empirical::{semivariogram, EmpiricalCurve};
use super::model::VariogramModel;

/// Parameters for range fitting
#[derive(Debug, Clone)]
pub struct FitParams {
    /// Number of candidate ranges on the search grid (default 1000)
    pub mesh_size: usize,
    /// Inclusive search bounds for the range. If None, spans the second to
    /// the last lag of the curve.
    pub range_bounds: Option<(f64, f64)>,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            mesh_size: 1000,
            range_bounds: None,
        }
    }
}

/// Covariance as a function of separation distance.
///
/// This is what kriging consumes: anything that can turn a distance into a
/// covariance and report its sill.
pub trait CovarianceFunction: Sync {
    /// Covariance at distance `h`
    fn covariance(&self, h: f64) -> f64;

    /// Covariance at distance zero
    fn sill(&self) -> f64;

    /// Covariance over an array of distances, preserving its shape.
    fn covariance_array<S, D>(&self, h: &ArrayBase<S, D>) -> Array<f64, D>
    where
        S: Data<Elem = f64>,
        D: Dimension,
        Self: Sized,
    {
        h.mapv(|d| self.covariance(d))
    }
}

/// A variogram model with its fitted parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Model type
    pub model: VariogramModel,
    /// Range (or exponent, for the power model)
    pub range: f64,
    /// Sill (c)
    pub sill: f64,
    /// Mean squared error against the empirical curve (0 if set by hand)
    pub mse: f64,
}

impl FittedModel {
    /// Model with hand-picked parameters.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if the parameters are not valid for `model`.
    pub fn new(model: VariogramModel, range: f64, sill: f64) -> Result<Self> {
        model.check_params(range, sill)?;
        Ok(Self {
            model,
            range,
            sill,
            mse: 0.0,
        })
    }

    /// Fitted semivariance at distance `h`
    #[inline]
    pub fn semivariance(&self, h: f64) -> f64 {
        self.model.evaluate_unchecked(h, self.range, self.sill)
    }
}

impl CovarianceFunction for FittedModel {
    #[inline]
    fn covariance(&self, h: f64) -> f64 {
        self.sill - self.semivariance(h)
    }

    fn sill(&self) -> f64 {
        self.sill
    }
}

/// Fit the range of `model` to an empirical curve, with the sill held fixed.
///
/// # Arguments
/// * `curve` - Empirical curve (lags and statistic values)
/// * `model` - Model type to fit
/// * `sill` - Sill passed to the model at every candidate range
/// * `params` - Search grid size and optional bounds
///
/// # Errors
/// - [`Error::InsufficientData`] if the curve has fewer than 2 lags and no
///   bounds are given (or is empty)
/// - [`Error::InvalidParameter`] for a zero mesh, non-positive bounds or a
///   non-finite sill
pub fn fit_model(
    curve: &EmpiricalCurve,
    model: VariogramModel,
    sill: f64,
    params: &FitParams,
) -> Result<FittedModel> {
    if curve.is_empty() {
        return Err(Error::InsufficientData { needed: 1, got: 0 });
    }
    if params.mesh_size == 0 {
        return Err(Error::invalid_parameter("mesh_size", 0, "must be > 0"));
    }
    if !sill.is_finite() {
        return Err(Error::invalid_parameter("sill", sill, "must be finite"));
    }

    let (lo, hi) = match params.range_bounds {
        Some(bounds) => bounds,
        None => {
            if curve.len() < 2 {
                return Err(Error::InsufficientData {
                    needed: 2,
                    got: curve.len(),
                });
            }
            (curve.lags[1], curve.lags[curve.len() - 1])
        }
    };
    if !(lo > 0.0 && lo.is_finite()) {
        return Err(Error::invalid_parameter("range_bounds.0", lo, "must be finite and > 0"));
    }
    if !(hi >= lo && hi.is_finite()) {
        return Err(Error::invalid_parameter("range_bounds.1", hi, "must be finite and >= lower bound"));
    }

    let mesh = params.mesh_size;
    let step = if mesh > 1 { (hi - lo) / (mesh - 1) as f64 } else { 0.0 };

    let mut best_mse = f64::INFINITY;
    let mut best_range = lo;
    for k in 0..mesh {
        let a = if k + 1 == mesh { hi } else { lo + step * k as f64 };
        let mse = curve
            .points()
            .map(|(h, y)| {
                let r = y - model.evaluate_unchecked(h, a, sill);
                r * r
            })
            .sum::<f64>()
            / curve.len() as f64;
        if mse < best_mse {
            best_mse = mse;
            best_range = a;
        }
    }

    debug!(model = %model, range = best_range, sill, mse = best_mse, "fitted variogram range");

    Ok(FittedModel {
        model,
        range: best_range,
        sill,
        mse: best_mse,
    })
}

/// Build the semivariogram of `points`, take the population variance of the
/// values as the sill and fit the range of `model`.
pub fn fit_variogram(
    points: &[SamplePoint],
    model: VariogramModel,
    lags: &[f64],
    tol: f64,
    params: &FitParams,
) -> Result<FittedModel> {
    let curve = semivariogram(points, lags, tol)?;
    let sill = population_variance(points).ok_or(Error::InsufficientData { needed: 1, got: 0 })?;
    fit_model(&curve, model, sill, params)
}
