use serde::{Deserialize, Serialize};

pub type ObserverId = String;
pub type ShapeId = String;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Which side of a segment casts a shadow. Sides use the y-up convention:
/// walking from `start` to `end`, `Left` is counter-clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sidedness {
    #[default]
    None,
    Left,
    Right,
}

/// Typed view of one vision-blocking host shape, in scene space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstruction {
    pub id: ShapeId,
    pub vertices: Vec<Point>,
    pub sidedness: Sidedness,
    pub closed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObstructionSegment {
    pub start: Point,
    pub end: Point,
    pub owner: ShapeId,
    pub sidedness: Sidedness,
    pub closed: bool,
}

impl Obstruction {
    pub fn segments(&self) -> impl Iterator<Item = ObstructionSegment> + '_ {
        self.vertices.windows(2).map(move |w| ObstructionSegment {
            start: w[0],
            end: w[1],
            owner: self.id.clone(),
            sidedness: self.sidedness,
            closed: self.closed,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Vertex loop of a filled shape. Polygons are stored with the first
    /// vertex repeated at the end, so the loop is every vertex but the last.
    pub fn interior(&self) -> Option<&[Point]> {
        if !self.closed || self.vertices.len() < 4 {
            return None;
        }
        Some(&self.vertices[..self.vertices.len() - 1])
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub id: ObserverId,
    pub position: Point,
    /// Scene-space radius; `None` is unlimited range.
    pub vision_radius: Option<f64>,
}

/// The map's background-image rectangle in scene space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRect {
    pub fn left(&self) -> f64 { self.x }
    pub fn right(&self) -> f64 { self.x + self.width }
    pub fn top(&self) -> f64 { self.y }
    pub fn bottom(&self) -> f64 { self.y + self.height }

    /// Corner `k` closes edge `k` (top, right, bottom, left), walking
    /// clockwise on screen.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
            Point::new(self.left(), self.top()),
        ]
    }

    pub fn contains(&self, p: Point, eps: f64) -> bool {
        p.x >= self.left() - eps
            && p.x <= self.right() + eps
            && p.y >= self.top() - eps
            && p.y <= self.bottom() + eps
    }
}
