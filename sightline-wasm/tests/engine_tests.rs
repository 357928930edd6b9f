#![cfg(target_arch = "wasm32")]

use js_sys::{Reflect, JSON};
use sightline_wasm::{init_logging, VisionEngine};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn get(v: &JsValue, k: &str) -> JsValue {
    Reflect::get(v, &JsValue::from_str(k)).unwrap_or(JsValue::UNDEFINED)
}

fn is_ok(v: &JsValue) -> bool { get(v, "ok").as_bool().unwrap_or(false) }

fn is_err_code(v: &JsValue, code: &str) -> bool {
    !is_ok(v) && get(&get(v, "error"), "code").as_string().map_or(false, |s| s == code)
}

fn scene(hero_x: f64) -> JsValue {
    let ns = "com.armindoflores.fogofwar";
    let text = format!(
        r#"{{
            "ready": true,
            "metadata": {{"{ns}/visionEnabled": true}},
            "items": [
                {{"id": "map", "layer": "MAP", "type": "IMAGE",
                  "image": {{"width": 1000, "height": 1000}},
                  "metadata": {{"{ns}/isBackgroundImage": true}}}},
                {{"id": "wall", "layer": "DRAWING", "type": "LINE",
                  "points": [{{"x": 500, "y": 0}}, {{"x": 500, "y": 1000}}],
                  "metadata": {{"{ns}/isVisionLine": true}}}},
                {{"id": "hero", "layer": "CHARACTER", "type": "IMAGE",
                  "position": {{"x": {hero_x}, "y": 500}},
                  "metadata": {{"{ns}/hasVision": true}}}}
            ]
        }}"#
    );
    JSON::parse(&text).unwrap()
}

#[wasm_bindgen_test]
fn pass_round_trip() {
    let mut engine = VisionEngine::new();
    let r = engine.begin_res(scene(100.0));
    assert!(is_ok(&r));
    let value = get(&r, "value");
    assert_eq!(get(&value, "skipped").as_bool(), Some(false));
    let ticket = get(&value, "ticket").as_f64().unwrap();
    let add = get(&get(&value, "update"), "add");
    assert_eq!(get(&add, "length").as_f64(), Some(1.0));
    assert_eq!(get(&get(&add, "0"), "layer").as_string().as_deref(), Some("FOG"));

    // Coalesced while in flight.
    let busy = get(&engine.begin_res(scene(120.0)), "value");
    assert_eq!(get(&busy, "reason").as_string().as_deref(), Some("busy"));
    assert!(engine.is_busy());

    let done = engine.finish_res(ticket, true);
    assert!(is_ok(&done));
    assert_eq!(get(&get(&done, "value"), "cacheMisses").as_f64(), Some(1.0));
    assert!(!engine.last_report().is_null());
    assert_eq!(engine.cached_observers(), 1);

    let same = get(&engine.begin_res(scene(100.0)), "value");
    assert_eq!(get(&same, "reason").as_string().as_deref(), Some("unchanged"));
}

#[wasm_bindgen_test]
fn errors_are_typed() {
    let mut engine = VisionEngine::new();
    assert!(is_err_code(&engine.begin_res(JsValue::from_f64(3.0)), "json_parse"));
    assert!(is_err_code(&engine.finish_res(1.0, true), "stale_pass"));
    assert!(is_err_code(&engine.finish_res(f64::NAN, true), "non_finite"));

    let bad = JSON::parse(r#"{"edge_tolerance": -1}"#).unwrap();
    assert!(is_err_code(&engine.configure_res(bad), "invalid_config"));
    assert!(is_err_code(&init_logging("chatty"), "invalid_level"));
    assert!(is_ok(&init_logging("warn")));
}

#[wasm_bindgen_test]
fn reconfigure_resets_state() {
    let mut engine = VisionEngine::new();
    let ticket = get(&get(&engine.begin_res(scene(100.0)), "value"), "ticket").as_f64().unwrap();
    assert!(is_ok(&engine.finish_res(ticket, true)));

    let shared = JSON::parse(r#"{"merge_policy": "shared"}"#).unwrap();
    assert!(is_ok(&engine.configure_res(shared)));
    assert_eq!(engine.cached_observers(), 0);
    assert_eq!(get(&engine.config(), "merge_policy").as_string().as_deref(), Some("shared"));

    engine.invalidate();
    let again = get(&engine.begin_res(scene(100.0)), "value");
    assert_eq!(get(&again, "skipped").as_bool(), Some(false));
}

#[wasm_bindgen_test]
fn logging_level_can_change_after_install() {
    assert!(is_ok(&init_logging("debug")));
    assert!(is_ok(&init_logging("error")));
    assert_eq!(log::max_level(), log::LevelFilter::Error);
    assert!(is_ok(&init_logging("off")));
    assert_eq!(log::max_level(), log::LevelFilter::Off);
}
