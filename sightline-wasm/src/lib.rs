use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

pub use api::{init_logging, set_panic_hook};

use sightline::{Clock, Orchestrator, VisionConfig};

/// Browser clock; `Instant` does not exist on wasm32-unknown-unknown.
struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> f64 { js_sys::Date::now() }
}

#[wasm_bindgen]
pub struct VisionEngine { pub(crate) inner: Orchestrator }

impl VisionEngine {
    pub fn rs_new(config: VisionConfig) -> VisionEngine {
        VisionEngine { inner: Orchestrator::new(config).with_clock(Box::new(JsClock)) }
    }
}
