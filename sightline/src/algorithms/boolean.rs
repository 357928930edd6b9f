//! Boolean operations on polygon regions (intersect, difference).
//!
//! `Region` is the polygon-set value every stage of the engine passes
//! around: shadow polygons, running visibility masks, vision circles. The
//! actual clipping is delegated to a `PathOps` implementation; `GeoOps`
//! backs it with the `geo` crate's overlay engine.

use crate::geometry::tolerance::{circle_segments, EPS_FACE_AREA};
use crate::model::{BoundingRect, Point};
use geo::orient::{Direction, Orient};
use geo::{Area, BooleanOps, Coord, CoordsIter, LineString, MultiPolygon, Polygon, RemoveRepeatedPoints};

/// Boolean operation type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
    /// A ∩ B - areas in both A and B
    Intersect,
    /// A - B - areas in A but not in B
    Difference,
}

/// Error type for boolean operations
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BoolError {
    /// The primitive could not resolve the operands into a result.
    #[error("{op:?} produced no result: {reason}")]
    Degenerate { op: BoolOp, reason: String },
}

/// A set of polygons with holes, in scene-space floating coordinates.
///
/// Cloning yields an independent value; dropping it releases the geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    polygons: MultiPolygon<f64>,
}

/// The visible area of one observer.
pub type VisibilityMask = Region;

impl Default for Region {
    fn default() -> Self {
        Region::empty()
    }
}

fn coord(p: Point) -> Coord<f64> {
    Coord { x: p.x, y: p.y }
}

impl Region {
    pub fn empty() -> Self {
        Region { polygons: MultiPolygon::new(Vec::new()) }
    }

    pub fn from_polygons(polygons: MultiPolygon<f64>) -> Self {
        Region { polygons }
    }

    pub fn from_rect(rect: &BoundingRect) -> Self {
        Region::from_ring(&[
            Point::new(rect.left(), rect.top()),
            Point::new(rect.right(), rect.top()),
            Point::new(rect.right(), rect.bottom()),
            Point::new(rect.left(), rect.bottom()),
        ])
    }

    /// Closed polygon through `points`. Consecutive duplicates are dropped;
    /// fewer than three distinct vertices or a zero-area ring is empty.
    pub fn from_ring(points: &[Point]) -> Self {
        let mut coords: Vec<Coord<f64>> = Vec::with_capacity(points.len() + 1);
        for &p in points {
            let c = coord(p);
            if coords.last() != Some(&c) {
                coords.push(c);
            }
        }
        while coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }
        if coords.len() < 3 {
            return Region::empty();
        }
        let polygon = Polygon::new(LineString::from(coords), Vec::new());
        if polygon.unsigned_area() <= 0.0 {
            return Region::empty();
        }
        Region { polygons: MultiPolygon::new(vec![polygon]) }
    }

    /// Polygon inscribed in the circle, flattened so no chord strays more
    /// than `tol` from the arc.
    pub fn circle(center: Point, radius: f64, tol: f64) -> Self {
        if !(radius > 0.0) {
            return Region::empty();
        }
        let n = circle_segments(radius, tol);
        let step = std::f64::consts::TAU / n as f64;
        let ring: Vec<Point> = (0..n)
            .map(|i| {
                let a = step * i as f64;
                Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
            })
            .collect();
        Region::from_ring(&ring)
    }

    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.0.is_empty()
    }

    pub fn area(&self) -> f64 {
        self.polygons.unsigned_area()
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.polygons.coords_iter().map(|c| Point::new(c.x, c.y))
    }

    pub fn is_finite(&self) -> bool {
        self.polygons.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite())
    }

    /// Normalizes the output of chained boolean ops: repeated vertices are
    /// removed, slivers and pinhole rings below `EPS_FACE_AREA` are dropped.
    pub fn simplify(&self) -> Region {
        let polygons = self
            .polygons
            .0
            .iter()
            .filter_map(|p| {
                let p = p.remove_repeated_points();
                if p.unsigned_area() <= EPS_FACE_AREA {
                    return None;
                }
                let interiors = p
                    .interiors()
                    .iter()
                    .filter(|ring| {
                        Polygon::new((*ring).clone(), Vec::new()).unsigned_area() > EPS_FACE_AREA
                    })
                    .cloned()
                    .collect();
                Some(Polygon::new(p.exterior().clone(), interiors))
            })
            .collect();
        Region { polygons: MultiPolygon::new(polygons) }
    }

    /// Exteriors counter-clockwise and holes clockwise (y-up), so the
    /// result fills correctly under the nonzero rule.
    pub fn oriented(&self) -> Region {
        Region { polygons: self.polygons.orient(Direction::Default) }
    }
}

/// The polygon-boolean primitive the engine is built on.
pub trait PathOps {
    fn apply(&self, a: &Region, b: &Region, op: BoolOp) -> Result<Region, BoolError>;
}

/// `PathOps` over `geo::BooleanOps`. Stateless, so it may be shared freely.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoOps;

impl PathOps for GeoOps {
    fn apply(&self, a: &Region, b: &Region, op: BoolOp) -> Result<Region, BoolError> {
        if !a.is_finite() || !b.is_finite() {
            return Err(BoolError::Degenerate {
                op,
                reason: "operand has non-finite coordinates".to_string(),
            });
        }
        // Short-circuit empty operands; the overlay engine is not needed.
        match op {
            BoolOp::Difference if b.is_empty() || a.is_empty() => return Ok(a.clone()),
            BoolOp::Intersect if a.is_empty() || b.is_empty() => return Ok(Region::empty()),
            _ => {}
        }
        let polygons = match op {
            BoolOp::Intersect => a.polygons.intersection(&b.polygons),
            BoolOp::Difference => a.polygons.difference(&b.polygons),
        };
        let out = Region { polygons };
        if !out.is_finite() {
            return Err(BoolError::Degenerate {
                op,
                reason: "result has non-finite coordinates".to_string(),
            });
        }
        Ok(out)
    }
}
