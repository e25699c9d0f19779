//! Browser DOM layer for caret-bridge.
//!
//! This crate implements `DocumentEnvironment` over the DOM Selection and
//! Range APIs and wires the bridge to browser events. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `environment`: `BrowserEnvironment`, the web-sys document environment
//! - `events`: load and key-up listener wiring
//!
//! # Re-exports
//!
//! This crate re-exports `caret-bridge-core` for convenience, so consumers
//! only need to depend on `caret-bridge-browser`.

// Re-export core crate
pub use caret_bridge_core;
pub use caret_bridge_core::*;

pub mod environment;
pub mod events;

pub use environment::BrowserEnvironment;
pub use events::{attach_keyup_reporter, install_on_load};
