//! Variogram analysis
//!
//! From scattered samples to a covariance model:
//! - Bearing: compass bearings and angular sector tests
//! - Lags: pair binning by distance window and optional direction
//! - Empirical: semivariance / covariance per lag and full curves
//! - Model: catalog of theoretical variogram shapes
//! - Fit: grid-search range fitting and the resulting covariance function

pub mod bearing;
pub mod empirical;
pub mod fit;
pub mod lags;
pub mod model;

pub use bearing::{bearing, in_angle_sector, pair_bearings};
pub use empirical::{
    covariance, covariogram, directional_curve, empirical_curve, semivariance, semivariogram,
    EmpiricalCurve, Statistic,
};
pub use fit::{fit_model, fit_variogram, CovarianceFunction, FitParams, FittedModel};
pub use lags::{anisotropic_lag_indices, lag_indices, Direction, LagPair};
pub use model::VariogramModel;
