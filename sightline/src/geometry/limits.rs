// Ingestion limits to harden against untrusted host records

pub const MAX_SHAPE_POINTS: usize = 8_000;
pub const MAX_OBSTRUCTION_SEGMENTS: usize = 200_000;

// Numeric bounds
pub const COORD_MIN: f64 = -10_000_000.0;
pub const COORD_MAX: f64 =  10_000_000.0;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && (COORD_MIN..=COORD_MAX).contains(&x) }

#[inline]
pub fn in_size_bounds(w: f64) -> bool { w.is_finite() && w > 0.0 && w <= COORD_MAX }
