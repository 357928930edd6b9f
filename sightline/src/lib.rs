//! Line-of-sight fog of war for a 2D tabletop scene.
//!
//! Given a rectangular map, a set of vision-blocking shapes and a set of
//! observers, computes for each observer the region it can see and emits
//! fog-overlay paths that reveal it. Per-observer masks are cached between
//! passes and recomputed only when the observer moves or the map changes.

pub mod model;
pub mod geometry {
    pub mod limits;
    pub mod math;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod boolean;
    pub mod shadow;
    pub mod visibility;
}
pub mod cache;
pub mod config;
pub mod error;
pub mod fog;
pub mod orchestrator;
pub mod scene;
pub mod snapshot;
pub mod store;
pub mod timer;

pub use algorithms::boolean::{BoolError, BoolOp, GeoOps, PathOps, Region, VisibilityMask};
pub use config::{MergePolicy, VisionConfig};
pub use error::{StoreError, VisionError};
pub use fog::{FogItem, FogUpdate, PathCommand};
pub use model::{BoundingRect, Obstruction, Observer, ObserverId, Point, Sidedness};
pub use orchestrator::{Orchestrator, Outcome, Pass, PassReport, PassTicket, SkipReason, Trigger};
pub use scene::{SceneItem, SceneState};
pub use store::{MemoryStore, SceneStore};
pub use timer::Clock;
