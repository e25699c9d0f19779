//! Browser event wiring for the bridge.
//!
//! The only environment-driven operation is caret reporting: once the page has
//! loaded, every `keyup` inside the editable container measures the caret and
//! forwards it to the host. Listeners live for the lifetime of the page.

use std::rc::Rc;

use gloo_events::EventListener;

use caret_bridge_core::{CaretBridge, HostPort};

use crate::environment::BrowserEnvironment;

/// Bridge shared between event listeners and host entry points.
pub type SharedBridge<H> = Rc<CaretBridge<BrowserEnvironment, H>>;

/// Attach the key-up caret reporter to the editable container.
///
/// Returns `None` if the container is not in the document. Dropping the
/// returned listener detaches it.
pub fn attach_keyup_reporter<H: HostPort + 'static>(
    bridge: SharedBridge<H>,
) -> Option<EventListener> {
    let root = bridge.environment().root_element()?;
    Some(EventListener::new(&root, "keyup", move |_event| {
        bridge.report_caret_position();
    }))
}

/// Attach the key-up reporter once the window has finished loading.
///
/// The wasm module may finish instantiating after `load` has already fired;
/// in that case the reporter is attached immediately.
pub fn install_on_load<H: HostPort + 'static>(bridge: SharedBridge<H>) {
    let Some(window) = web_sys::window() else {
        tracing::warn!(target: "caret_bridge::browser", "no window, key-up reporting disabled");
        return;
    };

    if document_complete(&window) {
        attach_for_page(bridge);
        return;
    }

    EventListener::once(&window, "load", move |_event| attach_for_page(bridge)).forget();
}

fn attach_for_page<H: HostPort + 'static>(bridge: SharedBridge<H>) {
    let root_id = bridge.environment().root_id().to_string();
    match attach_keyup_reporter(bridge) {
        Some(listener) => {
            tracing::debug!(target: "caret_bridge::browser", root_id, "key-up reporter attached");
            listener.forget();
        }
        None => {
            tracing::warn!(
                target: "caret_bridge::browser",
                root_id,
                "editable container missing on load"
            );
        }
    }
}

fn document_complete(window: &web_sys::Window) -> bool {
    let Some(document) = window.document() else {
        return false;
    };
    document.ready_state() == "complete"
}
