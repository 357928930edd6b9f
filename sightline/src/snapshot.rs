//! Change detection between passes.
//!
//! A snapshot serializes the scene records that feed the computation. Value
//! equality decides whether anything must be recomputed at all; a coarser
//! per-component comparison decides whether cached masks survive.

use crate::config::VisionConfig;
use crate::model::BoundingRect;
use crate::scene::{GridInfo, SceneState};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneSnapshot {
    obstructions: String,
    observers: String,
    background: String,
    size: (f64, f64),
    grid: GridInfo,
    vision_enabled: bool,
    default_range: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    /// Nothing relevant changed.
    Unchanged,
    /// Observers moved or were added/removed, or a setting changed; cached
    /// masks of unmoved observers stay valid.
    Observers,
    /// Map size, background or obstruction set changed; every cached mask
    /// is stale.
    Structural,
}

fn serialize<'a, T: serde::Serialize + 'a>(items: impl Iterator<Item = &'a T>) -> String {
    let items: Vec<&T> = items.collect();
    serde_json::to_string(&items).unwrap_or_default()
}

impl SceneSnapshot {
    pub fn capture(scene: &SceneState, bounds: &BoundingRect, cfg: &VisionConfig) -> Self {
        SceneSnapshot {
            obstructions: serialize(scene.vision_shapes(cfg)),
            observers: serialize(scene.observer_items(cfg)),
            background: serialize(scene.background(cfg).into_iter()),
            size: (bounds.width, bounds.height),
            grid: scene.grid,
            vision_enabled: scene.vision_enabled(cfg),
            default_range: scene.default_vision_range(cfg),
        }
    }

    /// Classifies `self` against the previous snapshot. No previous
    /// snapshot is structural.
    pub fn classify(&self, previous: Option<&SceneSnapshot>) -> Change {
        let Some(prev) = previous else { return Change::Structural };
        if self == prev {
            return Change::Unchanged;
        }
        if self.size != prev.size || self.background != prev.background || self.obstructions != prev.obstructions {
            return Change::Structural;
        }
        Change::Observers
    }
}
