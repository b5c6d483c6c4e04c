//! Compass bearings and angular sectors
//!
//! Bearings are measured in degrees in `[0, 360)`, with 0 pointing north
//! (+y) and angles increasing clockwise, so east (+x) is 90. Every sector
//! test in the crate uses this convention.

use geokrig_core::SamplePoint;

use super::LagPair;

/// Compass bearing from `from` to `to`.
///
/// Returns 0 when the two locations coincide.
pub fn bearing(from: (f64, f64), to: (f64, f64)) -> f64 {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    // atan2 gives the counter-clockwise angle from +x; rotate to north, clockwise.
    let math_deg = dy.atan2(dx).to_degrees();
    normalize_degrees(90.0 - math_deg)
}

/// True iff `theta` lies in the half-open sector `[center - tolerance, center + tolerance)`.
///
/// Sectors that cross north (center − tolerance < 0 or center + tolerance > 360)
/// wrap around. A tolerance of 180 or more covers the whole circle; a
/// non-positive tolerance matches nothing.
pub fn in_angle_sector(theta: f64, center: f64, tolerance: f64) -> bool {
    if !(tolerance > 0.0) {
        return false;
    }
    if tolerance >= 180.0 {
        return true;
    }
    let offset = normalize_degrees(theta - (center - tolerance));
    offset < 2.0 * tolerance
}

/// Bearing of every pair in a lag set, from point `i` towards point `j`.
pub fn pair_bearings(points: &[SamplePoint], pairs: &[LagPair]) -> Vec<f64> {
    pairs
        .iter()
        .map(|p| bearing(points[p.i].xy(), points[p.j].xy()))
        .collect()
}

/// Map any angle into `[0, 360)`.
pub(crate) fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cardinal_directions() {
        let o = (0.0, 0.0);
        assert_abs_diff_eq!(bearing(o, (0.0, 1.0)), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bearing(o, (1.0, 0.0)), 90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bearing(o, (0.0, -1.0)), 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bearing(o, (-1.0, 0.0)), 270.0, epsilon = 1e-12);
    }

    #[test]
    fn test_diagonals() {
        let o = (0.0, 0.0);
        assert_abs_diff_eq!(bearing(o, (1.0, 1.0)), 45.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bearing(o, (1.0, -1.0)), 135.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bearing(o, (-1.0, -1.0)), 225.0, epsilon = 1e-12);
        assert_abs_diff_eq!(bearing(o, (-1.0, 1.0)), 315.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reciprocal_bearing() {
        let a = (2.0, 3.0);
        let b = (5.5, -1.25);
        let fwd = bearing(a, b);
        let back = bearing(b, a);
        assert_abs_diff_eq!(normalize_degrees(fwd + 180.0), back, epsilon = 1e-9);
    }

    #[test]
    fn test_coincident_is_zero() {
        assert_eq!(bearing((1.0, 1.0), (1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_bearing_range() {
        for k in 0..360 {
            let t = (k as f64).to_radians();
            let b = bearing((0.0, 0.0), (t.cos(), t.sin()));
            assert!((0.0..360.0).contains(&b), "bearing {} out of range", b);
        }
    }

    #[test]
    fn test_sector_plain() {
        assert!(in_angle_sector(45.0, 45.0, 10.0));
        assert!(in_angle_sector(35.0, 45.0, 10.0));
        assert!(!in_angle_sector(55.0, 45.0, 10.0));
        assert!(!in_angle_sector(100.0, 45.0, 10.0));
    }

    #[test]
    fn test_sector_wraps_below_zero() {
        // [350, 360) ∪ [0, 10)
        assert!(in_angle_sector(355.0, 0.0, 10.0));
        assert!(in_angle_sector(350.0, 0.0, 10.0));
        assert!(in_angle_sector(0.0, 0.0, 10.0));
        assert!(in_angle_sector(9.9, 0.0, 10.0));
        assert!(!in_angle_sector(10.0, 0.0, 10.0));
        assert!(!in_angle_sector(340.0, 0.0, 10.0));
    }

    #[test]
    fn test_sector_wraps_above_360() {
        // [330, 360) ∪ [0, 20)
        assert!(in_angle_sector(15.0, 355.0, 25.0));
        assert!(in_angle_sector(330.0, 355.0, 25.0));
        assert!(!in_angle_sector(20.0, 355.0, 25.0));
        assert!(!in_angle_sector(329.0, 355.0, 25.0));
    }

    #[test]
    fn test_sector_degenerate_tolerances() {
        assert!(!in_angle_sector(45.0, 45.0, 0.0));
        assert!(in_angle_sector(200.0, 45.0, 180.0));
    }
}
