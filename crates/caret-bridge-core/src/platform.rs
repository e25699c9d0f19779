//! Platform abstraction traits for the caret bridge.
//!
//! These traits define the interface between the bridge logic and the two
//! collaborators it talks to: the document environment (browser DOM, or the
//! in-memory document used in tests) and the host application that embeds it.
//! The bridge itself never touches browser globals.

use std::rc::Rc;

use crate::types::{ClientRect, ScrollOffset};

/// Error type for platform operations.
///
/// Never surfaced to the host: the bridge logs these and treats the call as a
/// no-op.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Selection, range and node operations of a document environment.
///
/// Nodes and ranges are handles into an environment that owns the actual
/// document, so every method takes `&self`. Offsets follow DOM boundary-point
/// rules: characters for text nodes, child indices for everything else.
pub trait DocumentEnvironment {
    /// Handle to a node in the document.
    type Node: Clone;
    /// Handle to a selection range.
    type Range;

    /// The editable container element.
    fn editable_root(&self) -> Option<Self::Node>;

    /// Resolve an element identifier anywhere in the document.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// The first range of the active selection.
    ///
    /// Returns `None` both when the environment has no selection API and when
    /// the selection holds no range.
    fn active_range(&self) -> Option<Self::Range>;

    /// Create a detached, empty inline element used to measure the caret.
    fn create_marker(&self) -> Result<Self::Node, PlatformError>;

    /// Insert `node` at the start of `range`, splitting a text node if needed.
    fn insert_node(&self, range: &Self::Range, node: &Self::Node) -> Result<(), PlatformError>;

    /// Viewport-relative box of `node`.
    fn client_rect(&self, node: &Self::Node) -> ClientRect;

    /// Current document scroll offset.
    fn scroll_offset(&self) -> ScrollOffset;

    /// Remove `node` from its parent. Detached nodes are left alone.
    fn detach(&self, node: &Self::Node) -> Result<(), PlatformError>;

    /// Serialized markup of the children of `node`.
    fn inner_html(&self, node: &Self::Node) -> String;

    /// Give input focus to `node`.
    fn focus(&self, node: &Self::Node);

    /// Remove the contents of `range`, leaving it collapsed at its start.
    fn delete_contents(&self, range: &Self::Range) -> Result<(), PlatformError>;

    /// Parse an HTML fragment into detached top-level nodes, in document order.
    fn parse_fragment(&self, html: &str) -> Result<Vec<Self::Node>, PlatformError>;

    /// Move `nodes` into a document fragment and insert it at the start of `range`.
    fn insert_fragment(&self, range: &Self::Range, nodes: &[Self::Node])
    -> Result<(), PlatformError>;

    /// Make a collapsed caret right after `node` the active selection.
    ///
    /// `range` is the range the caret is derived from; environments with live
    /// range objects clone it rather than build a new one.
    fn select_after(&self, range: &Self::Range, node: &Self::Node) -> Result<(), PlatformError>;

    /// Replace the active selection with a collapsed caret at `offset` in `node`.
    fn select_collapsed(&self, node: &Self::Node, offset: u32) -> Result<(), PlatformError>;
}

/// One-way notifications from the bridge to the host application.
///
/// Fire-and-forget: the bridge never waits for or inspects a reply.
pub trait HostPort {
    /// Caret moved to the given page-absolute position.
    fn on_caret_position(&self, x: f64, y: f64);

    /// Serialized content of the editable container, in reply to a fetch.
    fn on_content_fetched(&self, content: &str);
}

impl<H: HostPort + ?Sized> HostPort for &H {
    fn on_caret_position(&self, x: f64, y: f64) {
        (**self).on_caret_position(x, y)
    }

    fn on_content_fetched(&self, content: &str) {
        (**self).on_content_fetched(content)
    }
}

impl<H: HostPort + ?Sized> HostPort for Rc<H> {
    fn on_caret_position(&self, x: f64, y: f64) {
        (**self).on_caret_position(x, y)
    }

    fn on_content_fetched(&self, content: &str) {
        (**self).on_content_fetched(content)
    }
}
