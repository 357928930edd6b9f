//! Per-segment shadow polygons.
//!
//! For one obstruction segment and one observer, the shadow is the part of
//! the map behind the segment: the segment itself, the two observer rays
//! through its endpoints extended to the map boundary, and every boundary
//! corner swept between the two ray hits.

use crate::geometry::math::{cross, modulo, square_distance};
use crate::geometry::tolerance::approx_eq;
use crate::model::{BoundingRect, ObstructionSegment, Point, Sidedness};

/// Edge of the bounding rectangle, numbered clockwise on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RectEdge {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipCause {
    /// One-sided segment seen from its see-through side.
    LitSide,
    /// Observer sits exactly on an endpoint; the ray has no direction.
    ObserverOnEndpoint,
    /// No part of the segment lies on the map.
    OutsideMap,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShadowPolygon {
    /// `start, proj(start), corners.., proj(end), end`
    pub points: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    Shadow(ShadowPolygon),
    Skip(SkipCause),
}

/// True when `observer` looks through a one-sided segment.
pub fn is_lit_side(sidedness: Sidedness, side: f64) -> bool {
    match sidedness {
        Sidedness::None => false,
        Sidedness::Left => side > 0.0,
        Sidedness::Right => side < 0.0,
    }
}

/// Liang-Barsky clip of `a -> b` against `rect`. `None` when no part of the
/// segment is inside.
pub fn clip_segment(a: Point, b: Point, rect: &BoundingRect) -> Option<(Point, Point)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let bounds = [
        (-dx, a.x - rect.left()),
        (dx, rect.right() - a.x),
        (-dy, a.y - rect.top()),
        (dy, rect.bottom() - a.y),
    ];
    for (p, q) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| Point::new(a.x + t * dx, a.y + t * dy);
    let start = if t0 > 0.0 { at(t0) } else { a };
    let end = if t1 < 1.0 { at(t1) } else { b };
    Some((start, end))
}

/// Extends the ray `observer -> p` until it meets the rectangle boundary.
fn project_to_boundary(observer: Point, p: Point, rect: &BoundingRect) -> Option<Point> {
    let vx = p.x - observer.x;
    let vy = p.y - observer.y;
    let xlim = if vx < 0.0 { rect.left() } else { rect.right() };
    let ylim = if vy < 0.0 { rect.top() } else { rect.bottom() };

    let on_vertical = (vx != 0.0).then(|| {
        let m = vy / vx;
        let b = p.y - m * p.x;
        Point::new(xlim, m * xlim + b)
    });
    let on_horizontal = (vy != 0.0).then(|| {
        let n = vx / vy;
        let c = n * p.y - p.x;
        Point::new(n * ylim - c, ylim)
    });

    match (on_vertical, on_horizontal) {
        (Some(a), Some(b)) => {
            if square_distance(a, p) < square_distance(b, p) {
                Some(a)
            } else {
                Some(b)
            }
        }
        (a, b) => a.or(b),
    }
}

pub fn classify_edge(p: Point, rect: &BoundingRect, tol: f64) -> RectEdge {
    if approx_eq(p.y, rect.top(), tol) {
        RectEdge::Top
    } else if approx_eq(p.y, rect.bottom(), tol) {
        RectEdge::Bottom
    } else if approx_eq(p.x, rect.left(), tol) {
        RectEdge::Left
    } else if approx_eq(p.x, rect.right(), tol) {
        RectEdge::Right
    } else {
        RectEdge::Top
    }
}

/// Corners crossed walking the boundary from `from` to `to` in `direction`
/// (+1 clockwise on screen, -1 counter-clockwise).
pub fn swept_corners(from: RectEdge, to: RectEdge, direction: i32, rect: &BoundingRect) -> Vec<Point> {
    let corners = rect.corners();
    let (from, to) = (from as i32, to as i32);
    let last = if direction == 1 { to } else { modulo(to - 1, 4) };
    let mut k = if direction == 1 { from } else { from - 1 };
    let mut out = Vec::with_capacity(4);
    while modulo(k, 4) != last && out.len() < 4 {
        out.push(corners[modulo(k, 4) as usize]);
        k += direction;
    }
    out
}

/// Shadow cast by `segment` as seen from `observer`, clipped to `rect`.
///
/// Only the part of the segment on the map is projected: a sight line
/// between two map points never leaves the map, so nothing outside it can
/// block one.
pub fn project(segment: &ObstructionSegment, observer: Point, rect: &BoundingRect, tol: f64) -> Projection {
    let side = cross(observer, segment.start, segment.end);
    if is_lit_side(segment.sidedness, side) {
        return Projection::Skip(SkipCause::LitSide);
    }
    let Some((start, end)) = clip_segment(segment.start, segment.end, rect) else {
        return Projection::Skip(SkipCause::OutsideMap);
    };

    let (Some(proj_start), Some(proj_end)) = (
        project_to_boundary(observer, start, rect),
        project_to_boundary(observer, end, rect),
    ) else {
        return Projection::Skip(SkipCause::ObserverOnEndpoint);
    };

    let edge_start = classify_edge(proj_start, rect, tol);
    let edge_end = classify_edge(proj_end, rect, tol);

    // Collinear observers sweep clockwise.
    let direction = if side > 0.0 { -1 } else { 1 };
    let corners = swept_corners(edge_start, edge_end, direction, rect);

    let mut points = Vec::with_capacity(corners.len() + 4);
    points.push(start);
    points.push(proj_start);
    points.extend(corners);
    points.push(proj_end);
    points.push(end);
    Projection::Shadow(ShadowPolygon { points })
}
