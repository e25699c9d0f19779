//! In-memory document environment.
//!
//! `MemoryDocument` implements [`DocumentEnvironment`] over an arena tree so
//! the bridge can be exercised without a rendering engine. Layout is a
//! deterministic monospace flow: every character advances the caret by
//! `char_width`, and `<br>` starts a new line `line_height` further down.
//!
//! `RecordingHost` is the matching [`HostPort`] that records notifications.

mod html;
mod tree;

use std::cell::{Cell, RefCell};

pub use html::{inner_html, parse_fragment};
pub use tree::{Boundary, MemoryRange, NodeId, NodeKind, Tree};

use crate::bridge::CONTENT_ELEMENT_ID;
use crate::platform::{DocumentEnvironment, HostPort, PlatformError};
use crate::types::{ClientRect, ScrollOffset};

/// Geometry of the monospace layout used for caret measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
    /// Viewport position of the container's first character.
    pub origin: (f64, f64),
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            origin: (8.0, 8.0),
            char_width: 8.0,
            line_height: 16.0,
        }
    }
}

/// A document holding one editable container with the standard id.
pub struct MemoryDocument {
    tree: RefCell<Tree>,
    root: NodeId,
    selection_api: bool,
    scroll: Cell<ScrollOffset>,
    focused: Cell<Option<NodeId>>,
    metrics: LayoutMetrics,
    created_markers: Cell<usize>,
}

impl MemoryDocument {
    /// Create a document whose editable container holds `content`.
    pub fn new(content: &str) -> Self {
        let mut tree = Tree::new();
        let root = tree.create_element(
            "div",
            vec![
                ("id".into(), CONTENT_ELEMENT_ID.to_string()),
                ("contenteditable".into(), "true".to_string()),
            ],
        );
        let doc = tree.document();
        tree.append_child(doc, root);
        for node in html::parse_fragment(&mut tree, content) {
            tree.append_child(root, node);
        }

        Self {
            tree: RefCell::new(tree),
            root,
            selection_api: true,
            scroll: Cell::new(ScrollOffset::default()),
            focused: Cell::new(None),
            metrics: LayoutMetrics::default(),
            created_markers: Cell::new(0),
        }
    }

    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Behave like an environment that has no selection API at all.
    pub fn without_selection_api(mut self) -> Self {
        self.selection_api = false;
        self
    }

    /// The editable container node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current serialized content of the editable container.
    pub fn content(&self) -> String {
        html::inner_html(&self.tree.borrow(), self.root)
    }

    /// Serialized content of any element.
    pub fn content_of(&self, node: NodeId) -> String {
        html::inner_html(&self.tree.borrow(), node)
    }

    pub fn set_scroll(&self, x: f64, y: f64) {
        self.scroll.set(ScrollOffset::new(x, y));
    }

    /// The selection's range. It is live: tree mutations move it.
    pub fn selection(&self) -> Option<MemoryRange> {
        self.tree.borrow().live_range()
    }

    pub fn set_selection(&self, range: Option<MemoryRange>) {
        self.tree.borrow_mut().set_live_range(range);
    }

    /// Collapse the selection at a char offset in the container's text.
    pub fn place_caret(&self, char_offset: usize) {
        let at = self.tree.borrow().boundary_at_char(self.root, char_offset);
        self.set_selection(Some(MemoryRange::collapsed(at)));
    }

    /// Select the chars in `start..end` of the container's text.
    pub fn select_chars(&self, start: usize, end: usize) {
        let tree = self.tree.borrow();
        let range = MemoryRange::new(
            tree.boundary_at_char(self.root, start),
            tree.boundary_at_char(self.root, end),
        );
        drop(tree);
        self.set_selection(Some(range));
    }

    /// Node that last received focus.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused.get()
    }

    /// How many probe markers the environment has been asked to create.
    pub fn created_markers(&self) -> usize {
        self.created_markers.get()
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.tree.borrow().is_attached(node)
    }

    /// Read access to the underlying tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&Tree) -> R) -> R {
        f(&self.tree.borrow())
    }
}

impl DocumentEnvironment for MemoryDocument {
    type Node = NodeId;
    type Range = MemoryRange;

    fn editable_root(&self) -> Option<NodeId> {
        Some(self.root)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.borrow().element_by_id(id)
    }

    fn active_range(&self) -> Option<MemoryRange> {
        if !self.selection_api {
            return None;
        }
        self.selection()
    }

    fn create_marker(&self) -> Result<NodeId, PlatformError> {
        self.created_markers.set(self.created_markers.get() + 1);
        Ok(self.tree.borrow_mut().create_element("span", Vec::new()))
    }

    fn insert_node(&self, range: &MemoryRange, node: &NodeId) -> Result<(), PlatformError> {
        self.insert_into_range(range, &[*node])
    }

    fn client_rect(&self, node: &NodeId) -> ClientRect {
        let tree = self.tree.borrow();
        let Some((column, line)) = tree.flow_position(self.root, *node) else {
            return ClientRect::default();
        };
        let m = self.metrics;
        ClientRect::new(
            m.origin.0 + column as f64 * m.char_width,
            m.origin.1 + line as f64 * m.line_height,
            0.0,
            m.line_height,
        )
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll.get()
    }

    fn detach(&self, node: &NodeId) -> Result<(), PlatformError> {
        self.tree.borrow_mut().detach(*node);
        Ok(())
    }

    fn inner_html(&self, node: &NodeId) -> String {
        self.content_of(*node)
    }

    fn focus(&self, node: &NodeId) {
        self.focused.set(Some(*node));
    }

    fn delete_contents(&self, range: &MemoryRange) -> Result<(), PlatformError> {
        let mut tree = self.tree.borrow_mut();
        let is_selection = tree.live_range() == Some(*range);
        let at = tree.delete_contents(*range);
        if is_selection {
            tree.set_live_range(Some(MemoryRange::collapsed(at)));
        }
        Ok(())
    }

    fn parse_fragment(&self, html: &str) -> Result<Vec<NodeId>, PlatformError> {
        Ok(html::parse_fragment(&mut self.tree.borrow_mut(), html))
    }

    fn insert_fragment(&self, range: &MemoryRange, nodes: &[NodeId]) -> Result<(), PlatformError> {
        self.insert_into_range(range, nodes)
    }

    fn select_after(&self, _range: &MemoryRange, node: &NodeId) -> Result<(), PlatformError> {
        let at = self
            .tree
            .borrow()
            .after(*node)
            .ok_or("node has no parent")?;
        self.set_selection(Some(MemoryRange::collapsed(at)));
        Ok(())
    }

    fn select_collapsed(&self, node: &NodeId, offset: u32) -> Result<(), PlatformError> {
        let offset = offset as usize;
        if offset > self.tree.borrow().node_len(*node) {
            return Err(format!("offset {} out of bounds", offset).into());
        }
        self.set_selection(Some(MemoryRange::collapsed(Boundary::new(*node, offset))));
        Ok(())
    }
}

impl MemoryDocument {
    /// `Range.insertNode` semantics: insert at the range start, and when the
    /// range is the selection and collapsed, extend its end past the new nodes.
    fn insert_into_range(&self, range: &MemoryRange, nodes: &[NodeId]) -> Result<(), PlatformError> {
        let mut tree = self.tree.borrow_mut();
        let is_selection = tree.live_range() == Some(*range);
        let (parent, index) = tree.insert_at(range.start, nodes)?;
        if is_selection && range.is_collapsed() {
            if let Some(mut live) = tree.live_range() {
                live.end = Boundary::new(parent, index + nodes.len());
                tree.set_live_range(Some(live));
            }
        }
        Ok(())
    }
}

/// A notification received by [`RecordingHost`].
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    CaretPosition { x: f64, y: f64 },
    Content(String),
}

/// Host port that keeps every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: RefCell<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Contents of every `Content` notification, in order.
    pub fn contents(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                HostEvent::Content(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }
}

impl HostPort for RecordingHost {
    fn on_caret_position(&self, x: f64, y: f64) {
        self.events
            .borrow_mut()
            .push(HostEvent::CaretPosition { x, y });
    }

    fn on_content_fetched(&self, content: &str) {
        self.events
            .borrow_mut()
            .push(HostEvent::Content(content.to_string()));
    }
}
