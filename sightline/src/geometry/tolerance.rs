// Centralized tolerances and helpers for robust geometry

pub const EDGE_TOL: f64 = 0.01;            // projected point vs. rectangle edge (scene px)
pub const EPS_FACE_AREA: f64 = 1e-6;       // polygons below this area are dropped by simplify (px^2)
pub const EPS_DENOM: f64 = 1e-12;          // denominator guard for ratios

// Circle flattening
pub const DEFAULT_FLATTEN_TOL: f64 = 0.25; // max sagitta of a circle chord (px)
pub const MIN_CIRCLE_SEGMENTS: usize = 16;
pub const MAX_CIRCLE_SEGMENTS: usize = 1024;

#[inline] pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool { (a - b).abs() <= eps }
#[inline] pub fn near_zero(x: f64, eps: f64) -> bool { x.abs() <= eps }

/// Number of chords needed so an inscribed polygon stays within `tol` of a
/// circle of radius `r`.
pub fn circle_segments(r: f64, tol: f64) -> usize {
    if !(r > 0.0) || !(tol > 0.0) || tol >= r {
        return MIN_CIRCLE_SEGMENTS;
    }
    let half_angle = (1.0 - tol / r).acos();
    if near_zero(half_angle, EPS_DENOM) {
        return MAX_CIRCLE_SEGMENTS;
    }
    let n = (std::f64::consts::PI / half_angle).ceil() as usize;
    n.clamp(MIN_CIRCLE_SEGMENTS, MAX_CIRCLE_SEGMENTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_segments_grow_with_radius() {
        let small = circle_segments(10.0, DEFAULT_FLATTEN_TOL);
        let large = circle_segments(5_000.0, DEFAULT_FLATTEN_TOL);
        assert!(small >= MIN_CIRCLE_SEGMENTS);
        assert!(large > small);
        assert!(large <= MAX_CIRCLE_SEGMENTS);
    }

    #[test]
    fn circle_segments_degenerate_inputs() {
        assert_eq!(circle_segments(0.0, 0.25), MIN_CIRCLE_SEGMENTS);
        assert_eq!(circle_segments(1.0, 0.0), MIN_CIRCLE_SEGMENTS);
        assert_eq!(circle_segments(f64::NAN, 0.25), MIN_CIRCLE_SEGMENTS);
    }
}
