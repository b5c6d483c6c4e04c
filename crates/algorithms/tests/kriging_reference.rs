//! End-to-end kriging checks against benchmarked values.
//!
//! The reference dataset is four points on the unit square,
//! (0,0,1) (1,0,3) (0,1,3) (1,1,4), kriged at the square's center from its
//! two nearest points with lags [0.5, 1.0, 1.5, 2.0] and tolerance 0.5.

use approx::assert_abs_diff_eq;
use geokrig_algorithms::interpolation::{
    krige, krige_point, krige_with_model, KrigingMethod, KrigingParams,
};
use geokrig_algorithms::variogram::{
    fit_model, semivariogram, CovarianceFunction, FitParams, FittedModel, VariogramModel,
};
use geokrig_core::{population_variance, Error, SamplePoint};

const LAGS: [f64; 4] = [0.5, 1.0, 1.5, 2.0];
const TOL: f64 = 0.5;
const CENTER: (f64, f64) = (0.5, 0.5);

fn unit_square() -> Vec<SamplePoint> {
    vec![
        SamplePoint::new(0.0, 0.0, 1.0),
        SamplePoint::new(1.0, 0.0, 3.0),
        SamplePoint::new(0.0, 1.0, 3.0),
        SamplePoint::new(1.0, 1.0, 4.0),
    ]
}

fn scattered(n: usize, seed: u64) -> Vec<SamplePoint> {
    let mut points = Vec::with_capacity(n);
    let mut rng = seed;
    for _ in 0..n {
        rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let x = (rng >> 33) as f64 / (1u64 << 31) as f64 * 50.0;
        rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let y = (rng >> 33) as f64 / (1u64 << 31) as f64 * 50.0;
        let value = (x / 8.0).sin() * 3.0 + (y / 11.0).cos() * 2.0 + 0.05 * x;
        points.push(SamplePoint::new(x, y, value));
    }
    points
}

// ---------------------------------------------------------------------------
// Benchmarked simple kriging estimates
// ---------------------------------------------------------------------------

#[test]
fn simple_kriging_spherical_reference() {
    let z = krige_with_model(&unit_square(), VariogramModel::Spherical, &LAGS, TOL, CENTER, 2)
        .expect("kriging failed");
    assert_abs_diff_eq!(z, 2.29891949337, epsilon = 1e-4);
}

#[test]
fn simple_kriging_exponential_reference() {
    let z = krige_with_model(&unit_square(), VariogramModel::Exponential, &LAGS, TOL, CENTER, 2)
        .expect("kriging failed");
    assert_abs_diff_eq!(z, 2.42879523605, epsilon = 1e-4);
}

#[test]
fn simple_kriging_gaussian_reference() {
    let z = krige_with_model(&unit_square(), VariogramModel::Gaussian, &LAGS, TOL, CENTER, 2)
        .expect("kriging failed");
    assert_abs_diff_eq!(z, 2.14052910511, epsilon = 1e-4);
}

#[test]
fn step_by_step_pipeline_matches_shortcut() {
    let points = unit_square();
    let curve = semivariogram(&points, &LAGS, TOL).unwrap();
    assert_eq!(curve.lags, vec![1.0, 1.5]);

    let sill = population_variance(&points).unwrap();
    let fitted = fit_model(&curve, VariogramModel::Spherical, sill, &FitParams::default()).unwrap();
    assert_abs_diff_eq!(fitted.covariance(0.0), sill, epsilon = 1e-15);

    let params = KrigingParams {
        neighbors: Some(2),
        ..Default::default()
    };
    let est = krige_point(&points, &fitted, CENTER, &params).unwrap();
    assert_eq!(est.neighbors, vec![0, 1]);
    assert_abs_diff_eq!(est.estimate, 2.29891949337, epsilon = 1e-4);
    assert!(est.variance >= 0.0 && est.variance <= sill);
}

// ---------------------------------------------------------------------------
// Degenerate and constrained cases
// ---------------------------------------------------------------------------

#[test]
fn constant_field_is_reproduced_exactly() {
    let value = 7.25;
    let points: Vec<SamplePoint> = scattered(20, 99)
        .into_iter()
        .map(|p| SamplePoint::new(p.x, p.y, value))
        .collect();

    for model in [
        VariogramModel::Spherical,
        VariogramModel::Exponential,
        VariogramModel::Gaussian,
    ] {
        let cov = FittedModel::new(model, 15.0, 2.0).unwrap();
        for n in [1, 3, 8] {
            let params = KrigingParams {
                neighbors: Some(n),
                ..Default::default()
            };
            for q in [(10.0, 10.0), (25.0, 40.0), (-5.0, 60.0)] {
                let est = krige_point(&points, &cov, q, &params).unwrap();
                assert_eq!(est.estimate, value, "{} n={} at {:?}", model, n, q);
                assert!(est.variance <= cov.sill() + 1e-12);
            }
        }
    }
}

#[test]
fn ordinary_kriging_weights_sum_to_one() {
    let points = scattered(60, 2024);
    let cov = FittedModel::new(VariogramModel::Spherical, 20.0, 5.0).unwrap();
    for n in [None, Some(4), Some(16)] {
        let params = KrigingParams {
            method: KrigingMethod::Ordinary,
            neighbors: n,
            ..Default::default()
        };
        for q in [(1.0, 1.0), (25.0, 25.0), (49.0, 12.0), (70.0, -10.0)] {
            let est = krige_point(&points, &cov, q, &params).unwrap();
            let total: f64 = est.weights.iter().sum();
            assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn ordinary_kriging_is_exact_at_samples() {
    let points = scattered(30, 5);
    let cov = FittedModel::new(VariogramModel::Exponential, 20.0, 5.0).unwrap();
    let params = KrigingParams {
        method: KrigingMethod::Ordinary,
        ..Default::default()
    };
    for p in points.iter().take(5) {
        let est = krige_point(&points, &cov, p.xy(), &params).unwrap();
        assert_abs_diff_eq!(est.estimate, p.value, epsilon = 1e-8);
    }
}

#[test]
fn coincident_points_are_singular() {
    let mut points = unit_square();
    points.push(SamplePoint::new(1.0, 0.0, 3.5));

    for model in VariogramModel::ALL {
        let cov = FittedModel::new(model, 1.5, 1.0).unwrap();
        for method in [KrigingMethod::Simple, KrigingMethod::Ordinary] {
            let params = KrigingParams {
                method,
                ..Default::default()
            };
            let err = krige_point(&points, &cov, (0.4, 0.3), &params).unwrap_err();
            assert!(
                matches!(err, Error::SingularMatrix { .. }),
                "{} {:?}: expected singular matrix, got {:?}",
                model,
                method,
                err
            );
        }
    }
}

#[test]
fn singular_query_does_not_abort_batch() {
    let mut points = unit_square();
    points.push(SamplePoint::new(5.0, 5.0, 2.0));
    points.push(SamplePoint::new(5.0, 5.0, 2.5));
    let cov = FittedModel::new(VariogramModel::Spherical, 1.5, 1.0).unwrap();
    let params = KrigingParams {
        neighbors: Some(2),
        ..Default::default()
    };

    // the first query only sees the square, the second the duplicated pair
    let result = krige(&points, &cov, &[(0.5, 0.5), (5.1, 5.0)], &params).unwrap();
    assert!(result.estimates[0].is_finite());
    assert!(result.estimates[1].is_nan());
    assert_eq!(result.failures.len(), 1);
    assert!(matches!(result.failures[0], (1, Error::SingularMatrix { .. })));
}
