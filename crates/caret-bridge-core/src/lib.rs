//! caret-bridge-core: caret and content bridge logic without browser dependencies.
//!
//! This crate provides:
//! - `DocumentEnvironment` trait for selection/range access
//! - `HostPort` trait for one-way notifications to the embedding host
//! - `CaretBridge` - the four bridge operations, generic over both
//! - `memory` - an in-memory document environment and recording host for tests

pub mod bridge;
pub mod memory;
pub mod platform;
pub mod types;

pub use bridge::{CONTENT_ELEMENT_ID, CaretBridge};
pub use platform::{DocumentEnvironment, HostPort, PlatformError};
pub use types::{ClientRect, PagePoint, ScrollOffset};
