//! Spatial statistics for scattered points
//!
//! - **Autocorrelation**: Global Moran's I with inverse-distance weights

mod autocorrelation;

pub use autocorrelation::{morans_i, MoransIResult};
