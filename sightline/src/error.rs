use crate::algorithms::boolean::BoolError;

/// Failure reported by the host scene store.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("scene store: {0}")]
pub struct StoreError(pub String);

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum VisionError {
    #[error("geometry: {0}")]
    Geometry(#[from] BoolError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("pass {got} is not the pass in flight ({expected:?})")]
    StalePass { got: u64, expected: Option<u64> },
}

impl VisionError {
    /// Stable machine-readable code for host-facing envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Geometry(_) => "degenerate_geometry",
            Self::Store(_) => "store_unavailable",
            Self::Config(_) => "invalid_config",
            Self::StalePass { .. } => "stale_pass",
        }
    }
}
