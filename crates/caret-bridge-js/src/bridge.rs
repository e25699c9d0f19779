//! The page's bridge instance and the global entry points the host calls.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use caret_bridge_browser::{BrowserEnvironment, CONTENT_ELEMENT_ID, CaretBridge, install_on_load};

use crate::host::JsHostPort;

type PageBridge = CaretBridge<BrowserEnvironment, JsHostPort>;

thread_local! {
    static BRIDGE: RefCell<Option<Rc<PageBridge>>> = const { RefCell::new(None) };
}

/// Build the page bridge and hook key-up reporting to the load event.
pub(crate) fn install() {
    let bridge = Rc::new(CaretBridge::new(
        BrowserEnvironment::new(CONTENT_ELEMENT_ID),
        JsHostPort::default(),
    ));
    BRIDGE.with(|slot| *slot.borrow_mut() = Some(bridge.clone()));
    install_on_load(bridge);
    if let Err(e) = expose_globals() {
        tracing::error!(target: "caret_bridge::js", "failed to expose entry points: {:?}", e);
    }
    tracing::debug!(target: "caret_bridge::js", "bridge installed");
}

/// Publish the entry points on `globalThis`, where `javascript:` URLs from
/// the host look them up.
fn expose_globals() -> Result<(), JsValue> {
    let global = js_sys::global();
    let get = Closure::<dyn Fn()>::new(get_content);
    let insert = Closure::<dyn Fn(String)>::new(|content: String| {
        insert_content_at_user_selection(&content)
    });
    let caret = Closure::<dyn Fn(String)>::new(|element_id: String| {
        set_cursor_position_at_element(&element_id)
    });

    js_sys::Reflect::set(&global, &"getContent".into(), &get.into_js_value())?;
    js_sys::Reflect::set(
        &global,
        &"insertContentAtUserSelection".into(),
        &insert.into_js_value(),
    )?;
    js_sys::Reflect::set(
        &global,
        &"setTheCursorPositionAtTheGivenElementId".into(),
        &caret.into_js_value(),
    )?;
    Ok(())
}

fn with_bridge(f: impl FnOnce(&PageBridge)) {
    // Clone out of the slot so no borrow is held while the bridge runs.
    let bridge = BRIDGE.with(|slot| slot.borrow().clone());
    match bridge {
        Some(bridge) => f(&bridge),
        None => tracing::warn!(target: "caret_bridge::js", "bridge called before init"),
    }
}

/// Send the editable container's markup to the host.
#[wasm_bindgen(js_name = getContent)]
pub fn get_content() {
    with_bridge(|bridge| bridge.fetch_content());
}

/// Replace the user's selection with an HTML fragment.
#[wasm_bindgen(js_name = insertContentAtUserSelection)]
pub fn insert_content_at_user_selection(content: &str) {
    with_bridge(|bridge| bridge.insert_content(content));
}

/// Put the caret at the start of the element with the given id, or at the
/// start of the editable container if there is none.
#[wasm_bindgen(js_name = setTheCursorPositionAtTheGivenElementId)]
pub fn set_cursor_position_at_element(element_id: &str) {
    with_bridge(|bridge| bridge.move_caret_to_element(element_id));
}
