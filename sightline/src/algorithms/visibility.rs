//! Folds per-segment shadows into one visibility mask per observer.

use crate::algorithms::boolean::{BoolError, BoolOp, PathOps, Region, VisibilityMask};
use crate::algorithms::shadow::{project, Projection};
use crate::model::{BoundingRect, Obstruction, Point};

/// Counters for one mask build; fed into the pass report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaskStats {
    pub shadows: usize,
    pub skipped: usize,
}

/// Shadow regions of every obstruction as seen from `observer`, with the
/// body of each filled obstruction cut back out so it stays visible.
pub fn shadow_regions<O: PathOps>(
    ops: &O,
    obstructions: &[Obstruction],
    observer: Point,
    bounds: &BoundingRect,
    edge_tol: f64,
    stats: &mut MaskStats,
) -> Result<Vec<Region>, BoolError> {
    let mut out = Vec::new();
    for obstruction in obstructions {
        let interior = obstruction.interior().map(Region::from_ring);
        for segment in obstruction.segments() {
            let shadow = match project(&segment, observer, bounds, edge_tol) {
                Projection::Shadow(shadow) => shadow,
                Projection::Skip(_) => {
                    stats.skipped += 1;
                    continue;
                }
            };
            let mut region = Region::from_ring(&shadow.points);
            if region.is_empty() {
                stats.skipped += 1;
                continue;
            }
            if let Some(body) = interior.as_ref() {
                region = ops.apply(&region, body, BoolOp::Difference)?;
            }
            stats.shadows += 1;
            out.push(region);
        }
    }
    Ok(out)
}

/// Visible area of `observer` before range clipping: the bounding rectangle
/// minus every shadow, simplified.
pub fn build_visibility_mask<O: PathOps>(
    ops: &O,
    obstructions: &[Obstruction],
    observer: Point,
    bounds: &BoundingRect,
    edge_tol: f64,
) -> Result<(VisibilityMask, MaskStats), BoolError> {
    let mut stats = MaskStats::default();
    let shadows = shadow_regions(ops, obstructions, observer, bounds, edge_tol, &mut stats)?;
    let mut visible = Region::from_rect(bounds);
    for shadow in &shadows {
        visible = ops.apply(&visible, shadow, BoolOp::Difference)?;
    }
    Ok((visible.simplify(), stats))
}

/// Intersects `mask` with a circle of `radius` around `center`; `None` is
/// unlimited range and returns the mask unchanged.
pub fn clip_to_range<O: PathOps>(
    ops: &O,
    mask: VisibilityMask,
    center: Point,
    radius: Option<f64>,
    flatten_tol: f64,
) -> Result<VisibilityMask, BoolError> {
    match radius {
        None => Ok(mask),
        Some(r) => {
            let circle = Region::circle(center, r, flatten_tol);
            ops.apply(&mask, &circle, BoolOp::Intersect)
        }
    }
}

/// Converts a vision range in grid units into a scene-space radius. Half a
/// cell is added so the observer's own cell counts as the origin.
pub fn vision_radius(range: f64, grid_dpi: f64, grid_scale: f64) -> f64 {
    grid_dpi * (range / grid_scale + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::boolean::GeoOps;
    use crate::geometry::tolerance::{DEFAULT_FLATTEN_TOL, EDGE_TOL};
    use crate::model::Sidedness;

    fn bounds() -> BoundingRect {
        BoundingRect { x: 0.0, y: 0.0, width: 1000.0, height: 1000.0 }
    }

    fn wall(id: &str, pts: &[(f64, f64)], sidedness: Sidedness, closed: bool) -> Obstruction {
        Obstruction {
            id: id.to_string(),
            vertices: pts.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            sidedness,
            closed,
        }
    }

    #[test]
    fn no_obstructions_leaves_whole_map() {
        let (mask, stats) = build_visibility_mask(&GeoOps, &[], Point::new(10.0, 10.0), &bounds(), EDGE_TOL).unwrap();
        assert!((mask.area() - 1_000_000.0).abs() < 1e-6);
        assert_eq!(stats, MaskStats::default());
    }

    #[test]
    fn wall_hides_far_half() {
        let w = wall("w", &[(500.0, 0.0), (500.0, 1000.0)], Sidedness::None, false);
        let (mask, stats) = build_visibility_mask(&GeoOps, &[w], Point::new(100.0, 500.0), &bounds(), EDGE_TOL).unwrap();
        assert_eq!(stats.shadows, 1);
        assert!((mask.area() - 500_000.0).abs() < 1e-2);
        assert!(mask.points().all(|p| p.x <= 500.0 + 1e-6));
    }

    #[test]
    fn filled_obstruction_body_stays_visible() {
        let square = [(400.0, 400.0), (600.0, 400.0), (600.0, 600.0), (400.0, 600.0), (400.0, 400.0)];
        let open = wall("open", &square, Sidedness::None, false);
        let filled = wall("filled", &square, Sidedness::None, true);
        let eye = Point::new(500.0, 100.0);
        let (open_mask, _) = build_visibility_mask(&GeoOps, &[open], eye, &bounds(), EDGE_TOL).unwrap();
        let (filled_mask, _) = build_visibility_mask(&GeoOps, &[filled], eye, &bounds(), EDGE_TOL).unwrap();
        // The filled square's own 200x200 body is part of the visible area.
        assert!((filled_mask.area() - open_mask.area() - 40_000.0).abs() < 1e-2);
    }

    #[test]
    fn range_clip_bounds_the_mask() {
        let (mask, _) = build_visibility_mask(&GeoOps, &[], Point::new(500.0, 500.0), &bounds(), EDGE_TOL).unwrap();
        let clipped = clip_to_range(&GeoOps, mask.clone(), Point::new(500.0, 500.0), Some(100.0), DEFAULT_FLATTEN_TOL).unwrap();
        let exact = std::f64::consts::PI * 100.0 * 100.0;
        assert!(clipped.area() <= exact && clipped.area() > exact * 0.99);
        let unlimited = clip_to_range(&GeoOps, mask.clone(), Point::new(500.0, 500.0), None, DEFAULT_FLATTEN_TOL).unwrap();
        assert_eq!(unlimited, mask);
    }

    #[test]
    fn radius_from_grid_units() {
        assert_eq!(vision_radius(60.0, 100.0, 1.0), 6050.0);
        assert_eq!(vision_radius(30.0, 150.0, 5.0), 975.0);
    }
}
