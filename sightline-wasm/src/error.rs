use crate::interop::{new_obj, set_kv};
use sightline::VisionError;
use wasm_bindgen::prelude::*;

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be a finite, non-negative number", param), Some(d.into()))
}

#[inline]
pub fn json_parse(what: &str, e: impl std::fmt::Display) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(what));
    err("json_parse", format!("{}: {}", what, e), Some(d.into()))
}

#[inline]
pub fn serialize(e: impl std::fmt::Display) -> JsValue {
    err("serialize", e.to_string(), None)
}

pub fn vision(e: &VisionError) -> JsValue {
    let data = match e {
        VisionError::StalePass { got, expected } => {
            let d = new_obj();
            set_kv(&d, "got", &JsValue::from_f64(*got as f64));
            let expected = expected.map_or(JsValue::NULL, |t| JsValue::from_f64(t as f64));
            set_kv(&d, "expected", &expected);
            Some(d.into())
        }
        _ => None,
    };
    err(e.code(), e.to_string(), data)
}
