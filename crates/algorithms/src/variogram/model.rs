//! Catalog of theoretical variogram models
//!
//! Every model maps a separation distance h, a range parameter `a` and a
//! sill `c` to a semivariance:
//!
//! | model       | γ(h)                                              |
//! |-------------|---------------------------------------------------|
//! | nugget      | 0 for h ≤ 0, c otherwise (`a` unused)             |
//! | linear      | (c/a)·h for h ≤ a, c otherwise                    |
//! | spherical   | c·[1.5(h/a) − 0.5(h/a)³] for h ≤ a, c otherwise   |
//! | exponential | c·[1 − exp(−3h/a)]                                |
//! | gaussian    | c·[1 − exp(−3h²/a²)]                              |
//! | power       | c·hᵃ                                              |
//!
//! The power model reads `a` as an exponent, not a range, and has no sill:
//! it grows without bound.

use ndarray::{Array, ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

use geokrig_core::{Error, Result};

/// Theoretical variogram model type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariogramModel {
    /// Pure nugget: a jump from 0 to `c` at the origin
    Nugget,
    /// Linear with sill: γ(h) = (c/a)·h up to the range
    Linear,
    /// Spherical model: γ(h) = c·[1.5(h/a) − 0.5(h/a)³] for h ≤ a; c for h > a
    Spherical,
    /// Exponential model: γ(h) = c·[1 − exp(−3h/a)]
    Exponential,
    /// Gaussian model: γ(h) = c·[1 − exp(−3h²/a²)]
    Gaussian,
    /// Power model: γ(h) = c·hᵃ, with `a` an exponent
    Power,
}

impl VariogramModel {
    /// Every model in the catalog
    pub const ALL: [VariogramModel; 6] = [
        VariogramModel::Nugget,
        VariogramModel::Linear,
        VariogramModel::Spherical,
        VariogramModel::Exponential,
        VariogramModel::Gaussian,
        VariogramModel::Power,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VariogramModel::Nugget => "nugget",
            VariogramModel::Linear => "linear",
            VariogramModel::Spherical => "spherical",
            VariogramModel::Exponential => "exponential",
            VariogramModel::Gaussian => "gaussian",
            VariogramModel::Power => "power",
        }
    }

    /// Check the shape parameters: `a` must be finite and > 0 (ignored for
    /// the nugget model), `c` must be finite.
    pub fn check_params(&self, a: f64, c: f64) -> Result<()> {
        if *self != VariogramModel::Nugget && !(a > 0.0 && a.is_finite()) {
            let name = if *self == VariogramModel::Power { "exponent" } else { "range" };
            return Err(Error::invalid_parameter(name, a, "must be finite and > 0"));
        }
        if !c.is_finite() {
            return Err(Error::invalid_parameter("sill", c, "must be finite"));
        }
        Ok(())
    }

    /// Semivariance at distance `h`.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if `a <= 0` or either parameter is non-finite.
    pub fn evaluate(&self, h: f64, a: f64, c: f64) -> Result<f64> {
        self.check_params(a, c)?;
        Ok(self.evaluate_unchecked(h, a, c))
    }

    /// Semivariance over an array of distances, preserving its shape.
    pub fn evaluate_array<S, D>(&self, h: &ArrayBase<S, D>, a: f64, c: f64) -> Result<Array<f64, D>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        self.check_params(a, c)?;
        Ok(h.mapv(|d| self.evaluate_unchecked(d, a, c)))
    }

    /// Semivariance without parameter checks. Invalid parameters produce
    /// NaN or infinities instead of an error.
    #[inline]
    pub fn evaluate_unchecked(&self, h: f64, a: f64, c: f64) -> f64 {
        match self {
            VariogramModel::Nugget => {
                if h <= 0.0 {
                    0.0
                } else {
                    c
                }
            }
            VariogramModel::Linear => {
                if h <= a {
                    (c / a) * h
                } else {
                    c
                }
            }
            VariogramModel::Spherical => {
                if h <= a {
                    let hr = h / a;
                    c * (1.5 * hr - 0.5 * hr * hr * hr)
                } else {
                    c
                }
            }
            VariogramModel::Exponential => c * (1.0 - (-3.0 * h / a).exp()),
            VariogramModel::Gaussian => c * (1.0 - (-3.0 * h * h / (a * a)).exp()),
            VariogramModel::Power => c * h.powf(a),
        }
    }
}

impl std::fmt::Display for VariogramModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for VariogramModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nugget" | "nug" => Ok(VariogramModel::Nugget),
            "linear" | "lin" => Ok(VariogramModel::Linear),
            "spherical" | "sph" => Ok(VariogramModel::Spherical),
            "exponential" | "exp" => Ok(VariogramModel::Exponential),
            "gaussian" | "gau" => Ok(VariogramModel::Gaussian),
            "power" | "pow" => Ok(VariogramModel::Power),
            _ => Err(Error::invalid_parameter(
                "model",
                s,
                "expected nugget, linear, spherical, exponential, gaussian or power",
            )),
        }
    }
}
