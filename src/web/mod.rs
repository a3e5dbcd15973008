//! Browser bindings (wasm32 only).
//!
//! Plugs Web Audio, the DOM, timers and the Cache Storage API into the
//! platform-independent controller and worker.

pub mod app;
pub mod audio;
pub mod handles;
pub mod service_worker;
pub mod view;

use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::error::PlayerError;

/// Install the console logger once per global scope.
pub(crate) fn init_logging(debug: bool) {
    let level = if debug { log::Level::Debug } else { log::Level::Info };
    // A second call (page reload inside the same scope) keeps the first logger.
    let _ = console_log::init_with_level(level);
}

/// Deserialize a config object; `undefined`/`null` yields the defaults.
pub(crate) fn config_from_js<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// Best-effort text for a thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

pub(crate) fn js_error(value: JsValue) -> PlayerError {
    PlayerError::Js(describe(&value))
}

pub(crate) fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}
