//! Fog-overlay output: path commands and the items a pass asks the host to
//! add or delete.

use crate::algorithms::boolean::Region;
use crate::config::VisionConfig;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt::Write;

// Host path verbs
pub const VERB_MOVE: u8 = 0;
pub const VERB_LINE: u8 = 1;
pub const VERB_CLOSE: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    Move(f64, f64),
    Line(f64, f64),
    Close,
}

/// Serialized as the host's verb arrays: `[0,x,y]`, `[1,x,y]`, `[5]`.
impl Serialize for PathCommand {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match *self {
            PathCommand::Move(x, y) => (VERB_MOVE, x, y).serialize(s),
            PathCommand::Line(x, y) => (VERB_LINE, x, y).serialize(s),
            PathCommand::Close => [VERB_CLOSE].serialize(s),
        }
    }
}

/// Boundary commands of every ring of `region`, one closed subpath each.
pub fn to_commands(region: &Region) -> Vec<PathCommand> {
    let oriented = region.oriented();
    let mut out = Vec::new();
    for polygon in &oriented.polygons().0 {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for ring in rings {
            let coords = &ring.0;
            // Rings are stored closed; the last coordinate repeats the first.
            let open = if coords.len() > 1 && coords.first() == coords.last() {
                &coords[..coords.len() - 1]
            } else {
                &coords[..]
            };
            let Some((first, rest)) = open.split_first() else { continue };
            out.push(PathCommand::Move(first.x, first.y));
            out.extend(rest.iter().map(|c| PathCommand::Line(c.x, c.y)));
            out.push(PathCommand::Close);
        }
    }
    out
}

pub fn to_svg_path(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for cmd in commands {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match *cmd {
            PathCommand::Move(x, y) => write!(d, "M {} {}", x, y),
            PathCommand::Line(x, y) => write!(d, "L {} {}", x, y),
            PathCommand::Close => write!(d, "Z"),
        };
    }
    d
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FogItem {
    pub name: String,
    pub layer: String,
    pub z_index: i32,
    pub locked: bool,
    pub visible: bool,
    pub fill_color: String,
    pub stroke_color: String,
    pub commands: Vec<PathCommand>,
    pub metadata: Map<String, Value>,
    /// Observers whose view this item reveals.
    pub observers: Vec<String>,
}

impl FogItem {
    pub fn new(region: &Region, observers: Vec<String>, cfg: &VisionConfig) -> Self {
        let mut metadata = Map::new();
        metadata.insert(cfg.key("isVisionFog"), Value::Bool(true));
        FogItem {
            name: cfg.fog.name.clone(),
            layer: cfg.fog.layer.clone(),
            z_index: cfg.fog.z_index,
            locked: cfg.fog.locked,
            visible: cfg.fog.visible,
            fill_color: cfg.fog.fill_color.clone(),
            stroke_color: cfg.fog.stroke_color.clone(),
            commands: to_commands(region),
            metadata,
            observers,
        }
    }

    pub fn svg_path(&self) -> String {
        to_svg_path(&self.commands)
    }
}

/// Everything one pass asks of the host. Fog is replaced wholesale: every
/// previously emitted item is deleted and the new ones added.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FogUpdate {
    pub add: Vec<FogItem>,
    pub delete: Vec<String>,
    pub fill_fog: bool,
}

impl FogUpdate {
    pub fn clear(delete: Vec<String>) -> Self {
        FogUpdate { add: Vec::new(), delete, fill_fog: false }
    }
}
