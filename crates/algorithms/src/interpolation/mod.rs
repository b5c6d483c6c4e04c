//! Spatial interpolation from scattered points
//!
//! - Simple Kriging: BLUE with the dataset mean as known mean
//! - Ordinary Kriging: BLUE with unit-sum weights (local mean)
//! - Batch and grid kriging built on the single-point solver

pub mod kriging;

pub use kriging::{
    krige, krige_grid, krige_point, krige_with_model, GridResult, KrigingEstimate,
    KrigingMethod, KrigingParams, KrigingResult, QueryGrid,
};
