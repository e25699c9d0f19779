//! Host side of the caret bridge.
//!
//! Everything the embedding application needs to drive the page:
//! - `config`: host settings loaded from KDL
//! - `page`: the HTML page that hosts the editable container
//! - `script`: `javascript:` calls into the page's entry points
//! - `units`: dp/px conversion and caret scaling
//! - `viewport`: keeping the caret visible inside a scroll container
//! - `touch`: routing touch gestures between the view and its parent
//! - `view`: `EditableView`, tying the above together, and `SharedView`,
//!   the handle the page reports to

pub mod config;
pub mod error;
pub mod page;
pub mod script;
pub mod touch;
pub mod units;
pub mod view;
pub mod viewport;

pub use config::HostConfig;
pub use error::HostError;
pub use page::PageTemplate;
pub use script::{HostCall, escape_ecmascript};
pub use touch::{TouchAction, TouchDisposition, TouchEvent, TouchTracker};
pub use units::{DEFAULT_DENSITY_DPI, dp_to_px, scale_to_device};
pub use view::{EditableView, ScriptTransport, ScrollContainer, SharedView};
pub use viewport::{Point, ViewRect, caret_scroll_target, offset_in_ancestor};
