use crate::error;
use crate::interop::{new_obj, set_kv, to_js};
use crate::VisionEngine;
use log::LevelFilter;
use sightline::{SceneState, SkipReason, Trigger, VisionConfig};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Routes `log` records to the browser console. `level` is one of off,
/// error, warn, info, debug, trace.
#[wasm_bindgen]
pub fn init_logging(level: &str) -> JsValue {
    let filter = match level.parse::<LevelFilter>() {
        Ok(filter) => filter,
        Err(e) => return error::err("invalid_level", format!("{}: {}", level, e), None),
    };
    // The console logger installs once; later calls only move the level.
    match filter.to_level() {
        Some(lvl) if console_log::init_with_level(lvl).is_ok() => {}
        _ => log::set_max_level(filter),
    }
    error::ok(JsValue::TRUE)
}

fn skip_name(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Busy => "busy",
        SkipReason::NotReady => "not_ready",
        SkipReason::StoreUnavailable => "store_unavailable",
        SkipReason::NoBackground => "no_background",
        SkipReason::Unchanged => "unchanged",
    }
}

#[wasm_bindgen]
impl VisionEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> VisionEngine {
        VisionEngine::rs_new(VisionConfig::default())
    }

    /// Replaces the configuration. Cached masks and the last snapshot are
    /// dropped; a pass in flight is abandoned.
    pub fn configure_res(&mut self, config: JsValue) -> JsValue {
        let value = match serde_wasm_bindgen::from_value::<serde_json::Value>(config) {
            Ok(v) => v,
            Err(e) => return error::json_parse("config", e),
        };
        match VisionConfig::from_value(value) {
            Ok(cfg) => {
                *self = VisionEngine::rs_new(cfg);
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::vision(&e),
        }
    }

    pub fn config(&self) -> JsValue {
        to_js(self.inner.config()).unwrap_or(JsValue::NULL)
    }

    /// Call on every scene change with the live scene. The value is either
    /// `{ skipped: true, reason }` or `{ skipped: false, ticket, update, report }`;
    /// apply `update` and hand `ticket` to `finish_res`.
    pub fn begin_res(&mut self, scene: JsValue) -> JsValue {
        let scene = match serde_wasm_bindgen::from_value::<SceneState>(scene) {
            Ok(s) => s,
            Err(e) => return error::json_parse("scene", e),
        };
        let o = new_obj();
        match self.inner.begin(&scene) {
            Trigger::Skipped(reason) => {
                set_kv(&o, "skipped", &JsValue::TRUE);
                set_kv(&o, "reason", &JsValue::from_str(skip_name(reason)));
            }
            Trigger::Pass(pass) => {
                let (update, report) = match (to_js(&pass.update), to_js(&pass.report)) {
                    (Ok(u), Ok(r)) => (u, r),
                    (Err(e), _) | (_, Err(e)) => {
                        // Nothing reaches the host, so the pass cannot complete.
                        let _ = self.inner.finish(pass.ticket, false);
                        return error::serialize(e);
                    }
                };
                set_kv(&o, "skipped", &JsValue::FALSE);
                set_kv(&o, "ticket", &JsValue::from_f64(pass.ticket as f64));
                set_kv(&o, "update", &update);
                set_kv(&o, "report", &report);
            }
        }
        error::ok(o.into())
    }

    /// Ends the pass `ticket`; `applied` tells whether the host accepted
    /// the update.
    pub fn finish_res(&mut self, ticket: f64, applied: bool) -> JsValue {
        if !ticket.is_finite() || ticket < 0.0 {
            return error::non_finite("ticket");
        }
        match self.inner.finish(ticket as u64, applied) {
            Ok(report) => match to_js(&report) {
                Ok(v) => error::ok(v),
                Err(e) => error::serialize(e),
            },
            Err(e) => error::vision(&e),
        }
    }

    pub fn invalidate(&mut self) {
        self.inner.invalidate();
    }

    pub fn is_busy(&self) -> bool {
        self.inner.is_busy()
    }

    pub fn cached_observers(&self) -> u32 {
        self.inner.cache().len() as u32
    }

    pub fn last_report(&self) -> JsValue {
        match self.inner.last_report() {
            Some(r) => to_js(r).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
}

impl Default for VisionEngine {
    fn default() -> Self {
        VisionEngine::new()
    }
}
