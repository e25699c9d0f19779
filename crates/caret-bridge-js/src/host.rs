//! Host port backed by the object the embedding application injects.

use smol_str::SmolStr;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use caret_bridge_core::HostPort;

/// Global name under which the host exposes its notification object.
pub const HOST_OBJECT_NAME: &str = "injectedObject";

#[wasm_bindgen]
extern "C" {
    /// The host's notification object.
    pub type InjectedObject;

    #[wasm_bindgen(method, catch, js_name = onContentKeyUpEventPosition)]
    fn on_content_key_up_event_position(this: &InjectedObject, x: f64, y: f64)
    -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = onContentReceived)]
    fn on_content_received(this: &InjectedObject, content: &str) -> Result<(), JsValue>;
}

/// Forwards bridge notifications to a global host object.
///
/// The object is looked up on every call, so a host that injects it late is
/// still reached. A missing object or a throwing callback is logged and
/// otherwise ignored.
pub struct JsHostPort {
    name: SmolStr,
}

impl JsHostPort {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into() }
    }

    fn object(&self) -> Option<InjectedObject> {
        let value = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(&self.name)).ok()?;
        if value.is_undefined() || value.is_null() {
            tracing::warn!(target: "caret_bridge::js", name = %self.name, "host object not found");
            return None;
        }
        Some(value.unchecked_into())
    }
}

impl Default for JsHostPort {
    fn default() -> Self {
        Self::new(HOST_OBJECT_NAME)
    }
}

impl HostPort for JsHostPort {
    fn on_caret_position(&self, x: f64, y: f64) {
        let Some(object) = self.object() else {
            return;
        };
        if let Err(e) = object.on_content_key_up_event_position(x, y) {
            tracing::warn!(target: "caret_bridge::js", "caret notification failed: {:?}", e);
        }
    }

    fn on_content_fetched(&self, content: &str) {
        let Some(object) = self.object() else {
            return;
        };
        if let Err(e) = object.on_content_received(content) {
            tracing::warn!(target: "caret_bridge::js", "content notification failed: {:?}", e);
        }
    }
}
