use crate::error::VisionError;
use crate::geometry::tolerance::{DEFAULT_FLATTEN_TOL, EDGE_TOL};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAMESPACE: &str = "com.armindoflores.fogofwar";

/// How the masks of several observers become fog items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// One fog item per observer; the party shares every member's view.
    #[default]
    PerObserver,
    /// A single fog item holding the intersection of all observers' views.
    Shared,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogStyle {
    pub layer: String,
    pub name: String,
    pub z_index: i32,
    pub fill_color: String,
    pub stroke_color: String,
    pub locked: bool,
    pub visible: bool,
}

impl Default for FogStyle {
    fn default() -> Self {
        FogStyle {
            layer: "FOG".to_string(),
            name: "Fog of War".to_string(),
            z_index: 3,
            fill_color: "#000000".to_string(),
            stroke_color: "#000000".to_string(),
            locked: true,
            visible: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Prefix of every metadata key the engine reads or writes.
    pub namespace: String,
    pub edge_tolerance: f64,
    pub circle_tolerance: f64,
    pub merge_policy: MergePolicy,
    /// Turn the host fog layer on when emitting fog items.
    pub fill_fog: bool,
    pub fog: FogStyle,
}

impl Default for VisionConfig {
    fn default() -> Self {
        VisionConfig {
            namespace: DEFAULT_NAMESPACE.to_string(),
            edge_tolerance: EDGE_TOL,
            circle_tolerance: DEFAULT_FLATTEN_TOL,
            merge_policy: MergePolicy::PerObserver,
            fill_fog: true,
            fog: FogStyle::default(),
        }
    }
}

impl VisionConfig {
    pub fn from_json(s: &str) -> Result<Self, VisionError> {
        let cfg: VisionConfig = serde_json::from_str(s).map_err(|e| VisionError::Config(e.to_string()))?;
        cfg.validate()
    }

    pub fn from_value(v: serde_json::Value) -> Result<Self, VisionError> {
        let cfg: VisionConfig = serde_json::from_value(v).map_err(|e| VisionError::Config(e.to_string()))?;
        cfg.validate()
    }

    pub fn validate(self) -> Result<Self, VisionError> {
        if !(self.edge_tolerance.is_finite() && self.edge_tolerance > 0.0) {
            return Err(VisionError::Config("edge_tolerance must be a positive number".into()));
        }
        if !(self.circle_tolerance.is_finite() && self.circle_tolerance > 0.0) {
            return Err(VisionError::Config("circle_tolerance must be a positive number".into()));
        }
        if self.namespace.is_empty() {
            return Err(VisionError::Config("namespace must not be empty".into()));
        }
        Ok(self)
    }

    /// Fully qualified metadata key, e.g. `com.armindoflores.fogofwar/hasVision`.
    pub fn key(&self, name: &str) -> String {
        format!("{}/{}", self.namespace, name)
    }
}
