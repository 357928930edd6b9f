//! Host scene store seam.

use crate::error::StoreError;
use crate::fog::FogUpdate;
use crate::scene::{SceneItem, SceneState};

/// Where the engine reads the scene from and writes fog to.
pub trait SceneStore {
    fn read(&self) -> Result<SceneState, StoreError>;
    fn apply(&mut self, update: &FogUpdate) -> Result<(), StoreError>;
}

/// In-process store: applying an update edits the held item list the way
/// the host would.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub scene: SceneState,
    pub available: bool,
    pub applied: Vec<FogUpdate>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new(scene: SceneState) -> Self {
        MemoryStore { scene, available: true, applied: Vec::new(), next_id: 0 }
    }

    pub fn last_update(&self) -> Option<&FogUpdate> {
        self.applied.last()
    }
}

impl SceneStore for MemoryStore {
    fn read(&self) -> Result<SceneState, StoreError> {
        if !self.available {
            return Err(StoreError("store offline".into()));
        }
        Ok(self.scene.clone())
    }

    fn apply(&mut self, update: &FogUpdate) -> Result<(), StoreError> {
        if !self.available {
            return Err(StoreError("store offline".into()));
        }
        self.scene.items.retain(|i| !update.delete.contains(&i.id));
        for fog in &update.add {
            self.next_id += 1;
            self.scene.items.push(SceneItem {
                id: format!("fog-{}", self.next_id),
                name: fog.name.clone(),
                layer: fog.layer.clone(),
                kind: "PATH".into(),
                metadata: fog.metadata.clone(),
                ..SceneItem::default()
            });
        }
        if update.fill_fog {
            self.scene.fog.filled = true;
        }
        self.applied.push(update.clone());
        Ok(())
    }
}
