//! # geokrig Algorithms
//!
//! Geostatistical analysis of scattered 2-D measurements.
//!
//! ## Available Algorithm Categories
//!
//! - **variogram**: Lag binning, empirical semivariance/covariance curves,
//!   directional (anisotropic) analysis, model catalog and range fitting
//! - **interpolation**: Simple and ordinary kriging, per point, batched or on a grid
//! - **statistics**: Global Moran's I
//!
//! The usual pipeline is points → [`variogram::semivariogram`] →
//! [`variogram::fit_model`] → [`interpolation::krige`].

pub(crate) mod maybe_rayon;

pub mod interpolation;
pub mod statistics;
pub mod variogram;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        krige, krige_grid, krige_point, KrigingMethod, KrigingParams, KrigingResult, QueryGrid,
    };
    pub use crate::statistics::morans_i;
    pub use crate::variogram::{
        covariogram, empirical_curve, fit_model, fit_variogram, semivariogram,
        CovarianceFunction, Direction, EmpiricalCurve, FitParams, FittedModel, Statistic,
        VariogramModel,
    };
    pub use geokrig_core::prelude::*;
}
