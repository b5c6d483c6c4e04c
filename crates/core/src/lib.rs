//! # geokrig Core
//!
//! Core types shared by the geokrig variogram and kriging algorithms.
//!
//! This crate provides:
//! - `SamplePoint`: a sampled `(x, y, value)` record
//! - `DistanceMatrix`: dense pairwise Euclidean distances
//! - `Error` / `Result`: the error taxonomy used across the workspace

pub mod distance;
pub mod error;
pub mod point;

pub use distance::{distances_to, DistanceMatrix};
pub use error::{Error, Result};
pub use point::{mean_value, points_from_rows, population_variance, validate_points, SamplePoint};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::distance::DistanceMatrix;
    pub use crate::error::{Error, Result};
    pub use crate::point::SamplePoint;
}
