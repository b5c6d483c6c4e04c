//! Simple and Ordinary Kriging
//!
//! Best Linear Unbiased Estimator (BLUE) for spatial data. Uses a covariance
//! model to compute interpolation weights that minimize estimation variance.
//!
//! Simple kriging assumes the global mean μ is known and solves `K·w = k`:
//! ```text
//! z*(x₀) = μ + Σ wᵢ·(z(xᵢ) − μ)
//! ```
//! Ordinary kriging estimates the mean locally through a unit-sum constraint
//! on the weights, enforced by a Lagrange multiplier ν:
//! ```text
//! [C(x₁,x₁) ... C(x₁,xₙ) 1] [w₁]   [C(x₁,x₀)]
//! [   ...     ...    ...  .] [. ] = [   ...   ]
//! [C(xₙ,x₁) ... C(xₙ,xₙ) 1] [wₙ]   [C(xₙ,x₀)]
//! [  1       ...    1     0] [ν ]   [    1    ]
//! ```
//! For both forms the reported variance is `sill + nugget − Σ wᵢ·C(xᵢ,x₀)`.
//!
//! Every query is solved independently from an immutable dataset, so a
//! batch of queries runs in parallel when the `parallel` feature is enabled.
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.

use crate::maybe_rayon::*;
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use geokrig_core::{distances_to, mean_value, validate_points, DistanceMatrix, Error, Result, SamplePoint};

use crate::variogram::{fit_variogram, CovarianceFunction, FitParams, VariogramModel};

/// Kriging variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KrigingMethod {
    /// Known global mean (the dataset mean)
    #[default]
    Simple,
    /// Unknown local mean, weights constrained to sum to one
    Ordinary,
}

/// Parameters for kriging
#[derive(Debug, Clone)]
pub struct KrigingParams {
    /// Simple or ordinary kriging
    pub method: KrigingMethod,
    /// Number of nearest points to use per estimate. `None` or `Some(0)`
    /// uses every point.
    pub neighbors: Option<usize>,
    /// Nugget added to the sill in the variance formula
    pub nugget: f64,
    /// Clamp negative variances to zero (true) or report them as-is (false).
    /// Either way the estimate is flagged with `negative_variance`.
    pub clamp_variance: bool,
    /// Abort a batch on the first failing query instead of recording it
    pub fail_fast: bool,
}

impl Default for KrigingParams {
    fn default() -> Self {
        Self {
            method: KrigingMethod::Simple,
            neighbors: None,
            nugget: 0.0,
            clamp_variance: true,
            fail_fast: false,
        }
    }
}

/// Kriging result at one query location
#[derive(Debug, Clone, PartialEq)]
pub struct KrigingEstimate {
    /// Interpolated value
    pub estimate: f64,
    /// Kriging variance (clamped to zero if negative and `clamp_variance` is set)
    pub variance: f64,
    /// Weights of the neighbors, Lagrange multiplier excluded
    pub weights: Vec<f64>,
    /// Dataset indices of the neighbors, nearest first
    pub neighbors: Vec<usize>,
    /// The raw variance came out negative (numerical ill-conditioning)
    pub negative_variance: bool,
}

impl KrigingEstimate {
    /// Standard deviation of the estimate. NaN for an unclamped negative variance.
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Result of kriging a batch of query locations.
///
/// `estimates` and `std_devs` are parallel to the queries. Queries that
/// failed hold NaN in both and are listed in `failures`.
#[derive(Debug, Clone)]
pub struct KrigingResult {
    pub estimates: Vec<f64>,
    pub std_devs: Vec<f64>,
    /// Indices of queries whose raw variance was negative
    pub negative_variance: Vec<usize>,
    /// `(query index, error)` for every failed query
    pub failures: Vec<(usize, Error)>,
}

/// A regular grid of query locations, inclusive of both ends on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryGrid {
    pub x_min: f64,
    pub x_max: f64,
    pub nx: usize,
    pub y_min: f64,
    pub y_max: f64,
    pub ny: usize,
}

impl QueryGrid {
    /// Cell center coordinates in row-major order (rows along y, columns along x).
    pub fn locations(&self) -> Vec<(f64, f64)> {
        let xs = linspace(self.x_min, self.x_max, self.nx);
        let ys = linspace(self.y_min, self.y_max, self.ny);
        ys.iter()
            .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
            .collect()
    }
}

/// Kriged grid: estimates and standard deviations shaped `(ny, nx)`.
#[derive(Debug, Clone)]
pub struct GridResult {
    pub estimate: Array2<f64>,
    pub std_dev: Array2<f64>,
    pub failures: Vec<(usize, Error)>,
}

/// Krige a single query location.
///
/// # Arguments
/// * `points` - Sample points with (x, y, value)
/// * `cov` - Covariance function (usually a fitted variogram model)
/// * `query` - Location `(x, y)` to estimate
/// * `params` - Method, neighbor count, nugget
///
/// # Errors
/// - [`Error::InvalidInput`] for an empty dataset or non-finite data/query
/// - [`Error::NonFinite`] if a covariance entry is NaN or infinite
/// - [`Error::SingularMatrix`] if the kriging system cannot be solved
pub fn krige_point<C: CovarianceFunction>(
    points: &[SamplePoint],
    cov: &C,
    query: (f64, f64),
    params: &KrigingParams,
) -> Result<KrigingEstimate> {
    check_inputs(points, params)?;
    solve_point(points, cov, query, params)
}

/// Krige every query location independently.
///
/// Per-query failures are recorded in [`KrigingResult::failures`] unless
/// `params.fail_fast` is set, in which case the first failure (in query
/// order) is returned.
pub fn krige<C: CovarianceFunction>(
    points: &[SamplePoint],
    cov: &C,
    queries: &[(f64, f64)],
    params: &KrigingParams,
) -> Result<KrigingResult> {
    check_inputs(points, params)?;

    let solved: Vec<Result<KrigingEstimate>> = queries
        .into_par_iter()
        .map(|q| solve_point(points, cov, *q, params))
        .collect();

    let mut result = KrigingResult {
        estimates: Vec::with_capacity(queries.len()),
        std_devs: Vec::with_capacity(queries.len()),
        negative_variance: Vec::new(),
        failures: Vec::new(),
    };

    for (idx, outcome) in solved.into_iter().enumerate() {
        match outcome {
            Ok(est) => {
                if est.negative_variance {
                    result.negative_variance.push(idx);
                }
                result.estimates.push(est.estimate);
                result.std_devs.push(est.std_dev());
            }
            Err(e) if params.fail_fast => return Err(e),
            Err(e) => {
                debug!(query = idx, error = %e, "kriging failed for query");
                result.estimates.push(f64::NAN);
                result.std_devs.push(f64::NAN);
                result.failures.push((idx, e));
            }
        }
    }

    Ok(result)
}

/// Krige a regular grid of locations.
pub fn krige_grid<C: CovarianceFunction>(
    points: &[SamplePoint],
    cov: &C,
    grid: &QueryGrid,
    params: &KrigingParams,
) -> Result<GridResult> {
    if grid.nx == 0 || grid.ny == 0 {
        return Err(Error::invalid_parameter(
            "grid",
            format!("{}x{}", grid.nx, grid.ny),
            "needs at least one cell per axis",
        ));
    }
    let locations = grid.locations();
    let batch = krige(points, cov, &locations, params)?;
    let shape = (grid.ny, grid.nx);
    let estimate = Array2::from_shape_vec(shape, batch.estimates)
        .map_err(|e| Error::Algorithm(e.to_string()))?;
    let std_dev = Array2::from_shape_vec(shape, batch.std_devs)
        .map_err(|e| Error::Algorithm(e.to_string()))?;
    Ok(GridResult {
        estimate,
        std_dev,
        failures: batch.failures,
    })
}

/// Fit `model` to the semivariogram of `points`, then simple-krige `query`
/// from its `n` nearest points.
///
/// The sill is the population variance of the values and the range is
/// searched over `[lags[1], lags[last]]` of the non-empty lags.
pub fn krige_with_model(
    points: &[SamplePoint],
    model: VariogramModel,
    lags: &[f64],
    tol: f64,
    query: (f64, f64),
    n: usize,
) -> Result<f64> {
    let fitted = fit_variogram(points, model, lags, tol, &FitParams::default())?;
    let params = KrigingParams {
        neighbors: Some(n),
        ..Default::default()
    };
    Ok(krige_point(points, &fitted, query, &params)?.estimate)
}

fn check_inputs(points: &[SamplePoint], params: &KrigingParams) -> Result<()> {
    if points.is_empty() {
        return Err(Error::InvalidInput("kriging requires at least one sample point".into()));
    }
    validate_points(points)?;
    if !(params.nugget >= 0.0 && params.nugget.is_finite()) {
        return Err(Error::invalid_parameter(
            "nugget",
            params.nugget,
            "must be finite and >= 0",
        ));
    }
    Ok(())
}

fn solve_point<C: CovarianceFunction>(
    points: &[SamplePoint],
    cov: &C,
    query: (f64, f64),
    params: &KrigingParams,
) -> Result<KrigingEstimate> {
    let (x0, y0) = query;
    if !x0.is_finite() || !y0.is_finite() {
        return Err(Error::InvalidInput(format!(
            "query location ({}, {}) is not finite",
            x0, y0
        )));
    }

    // Nearest neighbors, ties broken by dataset order
    let dists = distances_to(points, x0, y0);
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        dists[a]
            .partial_cmp(&dists[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let k = match params.neighbors {
        Some(n) if n > 0 => n.min(points.len()),
        _ => points.len(),
    };
    order.truncate(k);
    debug!(x = x0, y = y0, neighbors = k, "selected kriging neighbors");

    // Covariances between the neighbors and the query
    let rhs = Array1::from_iter(order.iter().map(|&i| cov.covariance(dists[i])));
    if let Some(row) = rhs.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFinite {
            what: "covariance vector",
            row,
            col: 0,
        });
    }

    // Covariances among the neighbors
    let neighbors: Vec<SamplePoint> = order.iter().map(|&i| points[i]).collect();
    let distances = DistanceMatrix::new(&neighbors)?;
    let cov_matrix = cov.covariance_array(&distances.view());
    if let Some(((row, col), _)) = cov_matrix.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(Error::NonFinite {
            what: "covariance matrix",
            row,
            col,
        });
    }

    let values = Array1::from_iter(neighbors.iter().map(|p| p.value));
    let (weights, estimate) = match params.method {
        KrigingMethod::Simple => {
            let mean = mean_value(points).unwrap_or(0.0);
            let w = kriging_solve(cov_matrix, rhs.clone())?;
            let estimate = w.dot(&(&values - mean)) + mean;
            (w, estimate)
        }
        KrigingMethod::Ordinary => {
            let mut system = Array2::<f64>::zeros((k + 1, k + 1));
            system.slice_mut(s![..k, ..k]).assign(&cov_matrix);
            system.slice_mut(s![..k, k]).fill(1.0);
            system.slice_mut(s![k, ..k]).fill(1.0);
            let mut augmented = Array1::<f64>::ones(k + 1);
            augmented.slice_mut(s![..k]).assign(&rhs);

            let solution = kriging_solve(system, augmented)?;
            let w = solution.slice(s![..k]).to_owned();
            let estimate = w.dot(&values);
            (w, estimate)
        }
    };

    let raw_variance = cov.sill() + params.nugget - rhs.dot(&weights);
    let negative_variance = raw_variance < 0.0;
    let variance = if negative_variance {
        warn!(
            x = x0,
            y = y0,
            variance = raw_variance,
            "negative kriging variance, system is ill-conditioned"
        );
        if params.clamp_variance {
            0.0
        } else {
            raw_variance
        }
    } else {
        raw_variance
    };

    Ok(KrigingEstimate {
        estimate,
        variance,
        weights: weights.to_vec(),
        neighbors: order,
        negative_variance,
    })
}

/// Relative pivot size below which the kriging system is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Solve `A·x = b` by Gaussian elimination with partial pivoting.
/// Sized for kriging systems, which stay small (tens of unknowns).
fn kriging_solve(mut mat: Array2<f64>, mut rhs: Array1<f64>) -> Result<Array1<f64>> {
    let n = rhs.len();
    let scale = mat.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 {
        return Err(Error::SingularMatrix { size: n });
    }
    let threshold = scale * SINGULAR_TOLERANCE;

    // Forward elimination
    for col in 0..n {
        let mut max_val = mat[(col, col)].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let val = mat[(row, col)].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val < threshold {
            return Err(Error::SingularMatrix { size: n });
        }

        if max_row != col {
            for j in 0..n {
                mat.swap((col, j), (max_row, j));
            }
            rhs.swap(col, max_row);
        }

        let pivot = mat[(col, col)];
        for row in (col + 1)..n {
            let factor = mat[(row, col)] / pivot;
            mat[(row, col)] = 0.0;
            for j in (col + 1)..n {
                mat[(row, j)] -= factor * mat[(col, j)];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back substitution
    let mut x = Array1::<f64>::zeros(n);
    for col in (0..n).rev() {
        let mut sum = rhs[col];
        for j in (col + 1)..n {
            sum -= mat[(col, j)] * x[j];
        }
        x[col] = sum / mat[(col, col)];
    }

    Ok(x)
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i + 1 == n { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}
