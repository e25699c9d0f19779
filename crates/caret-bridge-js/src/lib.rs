//! WASM bindings for the caret bridge.
//!
//! Loaded into the host page next to the editable container. On start it
//! builds the bridge over the live DOM, wires key-up caret reporting, and
//! exposes the host-invocable entry points as global functions:
//!
//! - `getContent()`
//! - `insertContentAtUserSelection(content)`
//! - `setTheCursorPositionAtTheGivenElementId(elementId)`
//!
//! Replies go to the object the host injects as `injectedObject`.

mod bridge;
mod host;

pub use bridge::*;
pub use host::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook, console logging, and the page bridge.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    init_tracing();
    bridge::install();
}

fn init_tracing() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}
