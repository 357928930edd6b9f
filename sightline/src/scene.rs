//! Host scene records and the typed views the engine computes on.
//!
//! The host hands over its raw item list and metadata maps; everything
//! string-keyed is resolved here, once per pass, so the geometry code only
//! ever sees `Obstruction`, `Observer` and `BoundingRect`.

use crate::algorithms::visibility::vision_radius;
use crate::config::VisionConfig;
use crate::geometry::limits;
use crate::model::{BoundingRect, Obstruction, Observer, Point, Sidedness};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const LAYER_MAP: &str = "MAP";
pub const LAYER_CHARACTER: &str = "CHARACTER";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageGrid {
    pub dpi: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    pub closed: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneItem {
    pub id: String,
    pub name: String,
    pub layer: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Point,
    pub scale: Point,
    pub points: Vec<Point>,
    pub metadata: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<ImageGrid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ShapeStyle>,
}

impl Default for SceneItem {
    fn default() -> Self {
        SceneItem {
            id: String::new(),
            name: String::new(),
            layer: String::new(),
            kind: String::new(),
            position: Point::default(),
            scale: Point::new(1.0, 1.0),
            points: Vec::new(),
            metadata: Map::new(),
            image: None,
            grid: None,
            style: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridInfo {
    pub dpi: f64,
    /// Grid units per cell, e.g. 5 for a "5ft" grid.
    pub scale: f64,
}

impl Default for GridInfo {
    fn default() -> Self {
        GridInfo { dpi: 150.0, scale: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogInfo {
    pub filled: bool,
}

/// Everything the engine reads from the host in one pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneState {
    pub ready: bool,
    pub items: Vec<SceneItem>,
    pub metadata: Map<String, Value>,
    pub grid: GridInfo,
    pub fog: FogInfo,
}

fn flag(metadata: &Map<String, Value>, key: &str) -> bool {
    metadata.get(key).and_then(Value::as_bool) == Some(true)
}

pub fn is_background(item: &SceneItem, cfg: &VisionConfig) -> bool {
    item.layer == LAYER_MAP && flag(&item.metadata, &cfg.key("isBackgroundImage"))
}

pub fn is_vision_fog(item: &SceneItem, cfg: &VisionConfig) -> bool {
    flag(&item.metadata, &cfg.key("isVisionFog"))
}

pub fn is_active_vision_line(item: &SceneItem, cfg: &VisionConfig) -> bool {
    flag(&item.metadata, &cfg.key("isVisionLine")) && !flag(&item.metadata, &cfg.key("disabled"))
}

pub fn is_observer(item: &SceneItem, cfg: &VisionConfig) -> bool {
    item.layer == LAYER_CHARACTER && flag(&item.metadata, &cfg.key("hasVision"))
}

/// Typed, per-pass view of the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneView {
    pub bounds: BoundingRect,
    pub obstructions: Vec<Obstruction>,
    pub observers: Vec<Observer>,
    pub vision_enabled: bool,
    /// Ids of fog items emitted by an earlier pass.
    pub fog_items: Vec<String>,
    pub fog_filled: bool,
}

impl SceneState {
    pub fn background(&self, cfg: &VisionConfig) -> Option<&SceneItem> {
        self.items.iter().find(|i| is_background(i, cfg))
    }

    pub fn vision_enabled(&self, cfg: &VisionConfig) -> bool {
        flag(&self.metadata, &cfg.key("visionEnabled"))
    }

    /// Scene-wide fallback range in grid units; `false` or absent is unlimited.
    pub fn default_vision_range(&self, cfg: &VisionConfig) -> Option<f64> {
        self.metadata
            .get(&cfg.key("playerVisionRange"))
            .and_then(Value::as_f64)
            .filter(|r| r.is_finite() && *r > 0.0)
    }

    pub fn vision_shapes<'a>(&'a self, cfg: &'a VisionConfig) -> impl Iterator<Item = &'a SceneItem> + 'a {
        self.items.iter().filter(move |i| is_active_vision_line(i, cfg))
    }

    pub fn observer_items<'a>(&'a self, cfg: &'a VisionConfig) -> impl Iterator<Item = &'a SceneItem> + 'a {
        self.items.iter().filter(move |i| is_observer(i, cfg))
    }

    /// Map rectangle from the background image: its position, and its
    /// pixel size brought to scene dpi and scaled.
    pub fn bounding_rect(&self, background: &SceneItem) -> Option<BoundingRect> {
        let image = background.image?;
        let image_dpi = background.grid.map(|g| g.dpi).unwrap_or(self.grid.dpi);
        if !(image_dpi > 0.0) {
            return None;
        }
        let ratio = self.grid.dpi / image_dpi;
        let rect = BoundingRect {
            x: background.position.x,
            y: background.position.y,
            width: image.width * ratio * background.scale.x.abs(),
            height: image.height * ratio * background.scale.y.abs(),
        };
        let ok = limits::in_coord_bounds(rect.x)
            && limits::in_coord_bounds(rect.y)
            && limits::in_size_bounds(rect.width)
            && limits::in_size_bounds(rect.height);
        ok.then_some(rect)
    }

    pub fn view(&self, cfg: &VisionConfig) -> Option<SceneView> {
        let background = self.background(cfg)?;
        let bounds = self.bounding_rect(background)?;

        let mut obstructions = Vec::new();
        let mut segments = 0usize;
        for item in self.vision_shapes(cfg) {
            let Some(o) = obstruction_from_item(item, cfg) else { continue };
            segments += o.segment_count();
            if segments > limits::MAX_OBSTRUCTION_SEGMENTS {
                log::warn!("obstruction segment cap reached; ignoring shapes from {}", item.id);
                break;
            }
            obstructions.push(o);
        }

        let default_range = self.default_vision_range(cfg);
        let observers = self
            .observer_items(cfg)
            .filter_map(|item| observer_from_item(item, cfg, default_range, &self.grid))
            .collect();

        Some(SceneView {
            bounds,
            obstructions,
            observers,
            vision_enabled: self.vision_enabled(cfg),
            fog_items: self.items.iter().filter(|i| is_vision_fog(i, cfg)).map(|i| i.id.clone()).collect(),
            fog_filled: self.fog.filled,
        })
    }
}

fn sidedness(item: &SceneItem, cfg: &VisionConfig) -> Sidedness {
    match item.metadata.get(&cfg.key("oneSided")).and_then(Value::as_str) {
        Some("left") => Sidedness::Left,
        Some("right") => Sidedness::Right,
        _ => Sidedness::None,
    }
}

/// Shape vertices are stored relative to the item; bring them to scene space.
pub fn obstruction_from_item(item: &SceneItem, cfg: &VisionConfig) -> Option<Obstruction> {
    if item.points.len() < 2 {
        return None;
    }
    if item.points.len() > limits::MAX_SHAPE_POINTS {
        log::warn!("vision shape {} has {} points; ignored", item.id, item.points.len());
        return None;
    }
    let vertices: Vec<Point> = item
        .points
        .iter()
        .map(|p| Point::new(p.x * item.scale.x + item.position.x, p.y * item.scale.y + item.position.y))
        .collect();
    if !vertices.iter().all(|v| limits::in_coord_bounds(v.x) && limits::in_coord_bounds(v.y)) {
        log::warn!("vision shape {} has out-of-range coordinates; ignored", item.id);
        return None;
    }
    Some(Obstruction {
        id: item.id.clone(),
        vertices,
        sidedness: sidedness(item, cfg),
        closed: item.style.and_then(|s| s.closed) != Some(false),
    })
}

pub fn observer_from_item(
    item: &SceneItem,
    cfg: &VisionConfig,
    default_range: Option<f64>,
    grid: &GridInfo,
) -> Option<Observer> {
    if !(limits::in_coord_bounds(item.position.x) && limits::in_coord_bounds(item.position.y)) {
        log::warn!("observer {} has an out-of-range position; ignored", item.id);
        return None;
    }
    let range = item
        .metadata
        .get(&cfg.key("visionRange"))
        .and_then(Value::as_f64)
        .filter(|r| r.is_finite() && *r > 0.0)
        .or(default_range);
    let vision_radius = range
        .map(|r| vision_radius(r, grid.dpi, grid.scale))
        .filter(|r| r.is_finite() && *r > 0.0);
    Some(Observer { id: item.id.clone(), position: item.position, vision_radius })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene() -> SceneState {
        serde_json::from_value(json!({
            "ready": true,
            "grid": {"dpi": 100.0, "scale": 1.0},
            "metadata": {"com.armindoflores.fogofwar/visionEnabled": true},
            "items": [
                {"id": "map", "layer": "MAP", "position": {"x": 10.0, "y": 20.0},
                 "scale": {"x": 2.0, "y": 2.0}, "image": {"width": 300.0, "height": 200.0},
                 "grid": {"dpi": 200.0},
                 "metadata": {"com.armindoflores.fogofwar/isBackgroundImage": true}},
                {"id": "wall", "layer": "DRAWING", "type": "CURVE",
                 "position": {"x": 100.0, "y": 0.0}, "scale": {"x": 1.0, "y": 1.0},
                 "points": [{"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 50.0}],
                 "style": {"closed": false},
                 "metadata": {"com.armindoflores.fogofwar/isVisionLine": true,
                              "com.armindoflores.fogofwar/oneSided": "left"}},
                {"id": "off", "layer": "DRAWING",
                 "points": [{"x": 0.0, "y": 0.0}, {"x": 5.0, "y": 5.0}],
                 "metadata": {"com.armindoflores.fogofwar/isVisionLine": true,
                              "com.armindoflores.fogofwar/disabled": true}},
                {"id": "hero", "layer": "CHARACTER", "position": {"x": 50.0, "y": 50.0},
                 "metadata": {"com.armindoflores.fogofwar/hasVision": true,
                              "com.armindoflores.fogofwar/visionRange": 30}},
                {"id": "npc", "layer": "CHARACTER", "position": {"x": 60.0, "y": 50.0}},
                {"id": "fog1", "layer": "FOG",
                 "metadata": {"com.armindoflores.fogofwar/isVisionFog": true}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn view_resolves_typed_records() {
        let cfg = VisionConfig::default();
        let view = scene().view(&cfg).unwrap();
        assert_eq!(view.bounds, BoundingRect { x: 10.0, y: 20.0, width: 300.0, height: 200.0 });
        assert_eq!(view.obstructions.len(), 1);
        let wall = &view.obstructions[0];
        assert_eq!(wall.vertices, vec![Point::new(100.0, 0.0), Point::new(100.0, 50.0)]);
        assert_eq!(wall.sidedness, Sidedness::Left);
        assert!(!wall.closed);
        assert_eq!(view.observers.len(), 1);
        assert_eq!(view.observers[0].vision_radius, Some(100.0 * (30.0 + 0.5)));
        assert!(view.vision_enabled);
        assert_eq!(view.fog_items, vec!["fog1".to_string()]);
    }

    #[test]
    fn scene_default_range_applies_to_observers_without_one() {
        let cfg = VisionConfig::default();
        let mut s = scene();
        s.metadata.insert(cfg.key("playerVisionRange"), json!(10));
        s.items[3].metadata.remove(&cfg.key("visionRange"));
        let view = s.view(&cfg).unwrap();
        assert_eq!(view.observers[0].vision_radius, Some(1050.0));

        s.metadata.insert(cfg.key("playerVisionRange"), json!(false));
        let view = s.view(&cfg).unwrap();
        assert_eq!(view.observers[0].vision_radius, None);
    }

    #[test]
    fn missing_background_has_no_view() {
        let cfg = VisionConfig::default();
        let mut s = scene();
        s.items.retain(|i| i.id != "map");
        assert!(s.view(&cfg).is_none());
    }

    #[test]
    fn shapes_default_to_closed() {
        let cfg = VisionConfig::default();
        let item = SceneItem {
            id: "poly".into(),
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 0.0)],
            ..SceneItem::default()
        };
        let o = obstruction_from_item(&item, &cfg).unwrap();
        assert!(o.closed);
        assert_eq!(o.interior().map(<[Point]>::len), Some(3));
    }
}
