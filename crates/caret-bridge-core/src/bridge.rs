//! The caret/content bridge.
//!
//! Four operations over the active selection of a document environment, with
//! results forwarded to the host through a [`HostPort`]. Nothing here reports
//! failure to the host: a missing selection, range or element turns the call
//! into a no-op (or a fallback to the editable container), and environment
//! errors are only logged.

use std::cell::OnceCell;

use crate::platform::{DocumentEnvironment, HostPort, PlatformError};
use crate::types::PagePoint;

/// Identifier of the editable container element in the host page.
pub const CONTENT_ELEMENT_ID: &str = "contentBody";

/// Bridge between an editable document and the host application.
///
/// Holds the environment, the host port and the probe marker used to measure
/// the caret. The marker is created on first use and reused afterwards; it is
/// only ever attached to the document for the duration of a single
/// measurement.
pub struct CaretBridge<E: DocumentEnvironment, H: HostPort> {
    env: E,
    host: H,
    probe: OnceCell<E::Node>,
}

impl<E: DocumentEnvironment, H: HostPort> CaretBridge<E, H> {
    pub fn new(env: E, host: H) -> Self {
        Self {
            env,
            host,
            probe: OnceCell::new(),
        }
    }

    /// The document environment this bridge operates on.
    pub fn environment(&self) -> &E {
        &self.env
    }

    /// The host port notifications are sent to.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Measure the caret and forward its page position to the host.
    ///
    /// Called on every key release in the editable container. Returns the
    /// reported point, or `None` when there was no range to measure.
    pub fn report_caret_position(&self) -> Option<PagePoint> {
        let Some(range) = self.env.active_range() else {
            tracing::trace!(target: "caret_bridge::bridge", "no active range, skipping caret report");
            return None;
        };

        let point = match self.measure(&range) {
            Ok(point) => point,
            Err(e) => {
                tracing::warn!(target: "caret_bridge::bridge", "caret measurement failed: {}", e);
                return None;
            }
        };

        tracing::trace!(
            target: "caret_bridge::bridge",
            x = point.x,
            y = point.y,
            "reporting caret position"
        );
        self.host.on_caret_position(point.x, point.y);
        Some(point)
    }

    /// Send the serialized content of the editable container to the host.
    pub fn fetch_content(&self) {
        let Some(root) = self.env.editable_root() else {
            tracing::warn!(target: "caret_bridge::bridge", "editable container not found");
            return;
        };
        let content = self.env.inner_html(&root);
        tracing::debug!(target: "caret_bridge::bridge", len = content.len(), "fetched content");
        self.host.on_content_fetched(&content);
    }

    /// Replace the current selection with the given HTML fragment.
    ///
    /// Without an active range nothing is inserted. After insertion the caret
    /// sits right after the last inserted node.
    pub fn insert_content(&self, html: &str) {
        let Some(root) = self.env.editable_root() else {
            tracing::warn!(target: "caret_bridge::bridge", "editable container not found");
            return;
        };
        self.env.focus(&root);

        let Some(range) = self.env.active_range() else {
            tracing::debug!(target: "caret_bridge::bridge", "no active range, dropping insert");
            return;
        };

        if let Err(e) = self.splice(&range, html) {
            tracing::warn!(target: "caret_bridge::bridge", "insert at selection failed: {}", e);
        }
    }

    /// Place a collapsed caret at the start of the element with the given id.
    ///
    /// Falls back to the editable container when no such element exists.
    pub fn move_caret_to_element(&self, element_id: &str) {
        let target = match self.env.element_by_id(element_id) {
            Some(node) => node,
            None => {
                tracing::debug!(
                    target: "caret_bridge::bridge",
                    element_id,
                    "element not found, falling back to editable container"
                );
                match self.env.editable_root() {
                    Some(root) => root,
                    None => {
                        tracing::warn!(target: "caret_bridge::bridge", "editable container not found");
                        return;
                    }
                }
            }
        };

        if let Err(e) = self.env.select_collapsed(&target, 0) {
            tracing::warn!(target: "caret_bridge::bridge", "placing caret failed: {}", e);
        }
    }

    fn measure(&self, range: &E::Range) -> Result<PagePoint, PlatformError> {
        let marker = self.probe()?;
        let probe = ProbeGuard::insert(&self.env, range, marker)?;
        let rect = self.env.client_rect(probe.node);
        let scroll = self.env.scroll_offset();
        drop(probe);
        Ok(PagePoint::from_client(rect, scroll))
    }

    fn splice(&self, range: &E::Range, html: &str) -> Result<(), PlatformError> {
        self.env.delete_contents(range)?;

        let nodes = self.env.parse_fragment(html)?;
        let Some(last) = nodes.last().cloned() else {
            tracing::trace!(target: "caret_bridge::bridge", "fragment parsed to no nodes");
            return Ok(());
        };

        self.env.insert_fragment(range, &nodes)?;
        self.env.select_after(range, &last)
    }

    fn probe(&self) -> Result<&E::Node, PlatformError> {
        if let Some(node) = self.probe.get() {
            return Ok(node);
        }
        let node = self.env.create_marker()?;
        Ok(self.probe.get_or_init(|| node))
    }
}

/// Probe marker attached at a range start; detached again on drop.
struct ProbeGuard<'a, E: DocumentEnvironment> {
    env: &'a E,
    node: &'a E::Node,
}

impl<'a, E: DocumentEnvironment> ProbeGuard<'a, E> {
    fn insert(env: &'a E, range: &E::Range, node: &'a E::Node) -> Result<Self, PlatformError> {
        env.insert_node(range, node)?;
        Ok(Self { env, node })
    }
}

impl<E: DocumentEnvironment> Drop for ProbeGuard<'_, E> {
    fn drop(&mut self) {
        if let Err(e) = self.env.detach(self.node) {
            tracing::error!(target: "caret_bridge::bridge", "failed to detach probe marker: {}", e);
        }
    }
}
