use crate::model::Point;

#[inline]
pub fn square_distance(p1: Point, p2: Point) -> f64 {
    let dx = p1.x - p2.x; let dy = p1.y - p2.y;
    dx*dx + dy*dy
}

#[inline]
pub fn distance(p1: Point, p2: Point) -> f64 { square_distance(p1, p2).sqrt() }

/// Exact component equality. A sub-pixel move is a different position.
#[inline]
#[allow(clippy::float_cmp)]
pub fn same_position(p1: Point, p2: Point) -> bool { p1.x == p2.x && p1.y == p2.y }

/// Signed area of `(p - s) x (e - s)`; the sign tells which side of the
/// directed segment `s -> e` the point `p` lies on.
#[inline]
pub fn cross(p: Point, s: Point, e: Point) -> f64 {
    (p.x - s.x) * (e.y - s.y) - (p.y - s.y) * (e.x - s.x)
}

/// Mathematical modulo: the result has the sign of `m`.
#[inline]
pub fn modulo(n: i32, m: i32) -> i32 { ((n % m) + m) % m }

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point { Point { x, y } }

    #[test]
    fn distances() {
        assert_eq!(square_distance(p(0.0, 0.0), p(3.0, 4.0)), 25.0);
        assert_eq!(distance(p(0.0, 0.0), p(3.0, 4.0)), 5.0);
    }

    #[test]
    fn same_position_has_no_epsilon() {
        assert!(same_position(p(1.5, 2.5), p(1.5, 2.5)));
        assert!(!same_position(p(1.5, 2.5), p(1.5 + 1e-9, 2.5)));
    }

    #[test]
    fn modulo_wraps_negative() {
        assert_eq!(modulo(-1, 4), 3);
        assert_eq!(modulo(-5, 4), 3);
        assert_eq!(modulo(6, 4), 2);
        assert_eq!(modulo(0, 4), 0);
    }

    #[test]
    fn cross_sign_by_side() {
        let s = p(500.0, 0.0);
        let e = p(500.0, 1000.0);
        assert!(cross(p(100.0, 500.0), s, e) < 0.0);
        assert!(cross(p(900.0, 500.0), s, e) > 0.0);
        assert_eq!(cross(p(500.0, 500.0), s, e), 0.0);
    }
}
