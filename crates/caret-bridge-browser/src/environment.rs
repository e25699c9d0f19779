//! Browser implementation of the document environment.
//!
//! Uses the DOM Selection and Range APIs. Every lookup goes through
//! `web_sys::window()` so a missing window or document degrades to `None`
//! instead of panicking.

use smol_str::SmolStr;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node, Range, Selection};

use caret_bridge_core::{ClientRect, DocumentEnvironment, PlatformError, ScrollOffset};

/// Document environment backed by the live browser DOM.
///
/// Holds the id of the editable container for DOM lookups.
pub struct BrowserEnvironment {
    root_id: SmolStr,
}

impl BrowserEnvironment {
    /// Create an environment around the editable container with the given id.
    pub fn new(root_id: impl Into<SmolStr>) -> Self {
        Self {
            root_id: root_id.into(),
        }
    }

    /// Get the editable container's element id.
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// The editable container as an element, for attaching listeners.
    pub fn root_element(&self) -> Option<Element> {
        document()?.get_element_by_id(&self.root_id)
    }

    fn selection(&self) -> Result<Selection, PlatformError> {
        let window = web_sys::window().ok_or("no window")?;
        window
            .get_selection()
            .map_err(|e| format!("get_selection failed: {:?}", e))?
            .ok_or_else(|| "no selection object".into())
    }

    fn replace_selection(&self, range: &Range) -> Result<(), PlatformError> {
        let selection = self.selection()?;
        selection
            .remove_all_ranges()
            .map_err(|e| format!("remove_all_ranges failed: {:?}", e))?;
        selection
            .add_range(range)
            .map_err(|e| format!("add_range failed: {:?}", e))?;
        Ok(())
    }
}

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

impl DocumentEnvironment for BrowserEnvironment {
    type Node = Node;
    type Range = Range;

    fn editable_root(&self) -> Option<Node> {
        self.root_element().map(Into::into)
    }

    fn element_by_id(&self, id: &str) -> Option<Node> {
        document()?.get_element_by_id(id).map(Into::into)
    }

    fn active_range(&self) -> Option<Range> {
        let selection = web_sys::window()?.get_selection().ok().flatten()?;
        if selection.range_count() == 0 {
            return None;
        }
        selection.get_range_at(0).ok()
    }

    fn create_marker(&self) -> Result<Node, PlatformError> {
        let document = document().ok_or("no document")?;
        let marker = document
            .create_element("span")
            .map_err(|e| format!("create_element failed: {:?}", e))?;
        Ok(marker.into())
    }

    fn insert_node(&self, range: &Range, node: &Node) -> Result<(), PlatformError> {
        range
            .insert_node(node)
            .map_err(|e| format!("insert_node failed: {:?}", e).into())
    }

    fn client_rect(&self, node: &Node) -> ClientRect {
        match node.dyn_ref::<Element>() {
            Some(element) => {
                let rect = element.get_bounding_client_rect();
                ClientRect::new(rect.left(), rect.top(), rect.width(), rect.height())
            }
            None => ClientRect::default(),
        }
    }

    fn scroll_offset(&self) -> ScrollOffset {
        let Some(window) = web_sys::window() else {
            return ScrollOffset::default();
        };
        ScrollOffset::new(
            window.scroll_x().unwrap_or(0.0),
            window.scroll_y().unwrap_or(0.0),
        )
    }

    fn detach(&self, node: &Node) -> Result<(), PlatformError> {
        if let Some(parent) = node.parent_node() {
            parent
                .remove_child(node)
                .map_err(|e| format!("remove_child failed: {:?}", e))?;
        }
        Ok(())
    }

    fn inner_html(&self, node: &Node) -> String {
        node.dyn_ref::<Element>()
            .map(Element::inner_html)
            .unwrap_or_default()
    }

    fn focus(&self, node: &Node) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            if let Err(e) = element.focus() {
                tracing::debug!(target: "caret_bridge::browser", "focus failed: {:?}", e);
            }
        }
    }

    fn delete_contents(&self, range: &Range) -> Result<(), PlatformError> {
        range
            .delete_contents()
            .map_err(|e| format!("delete_contents failed: {:?}", e).into())
    }

    fn parse_fragment(&self, html: &str) -> Result<Vec<Node>, PlatformError> {
        let document = document().ok_or("no document")?;
        let holder = document
            .create_element("div")
            .map_err(|e| format!("create_element failed: {:?}", e))?;
        holder.set_inner_html(html);

        let mut nodes = Vec::new();
        while let Some(child) = holder.first_child() {
            holder
                .remove_child(&child)
                .map_err(|e| format!("remove_child failed: {:?}", e))?;
            nodes.push(child);
        }
        Ok(nodes)
    }

    fn insert_fragment(&self, range: &Range, nodes: &[Node]) -> Result<(), PlatformError> {
        let document = document().ok_or("no document")?;
        let fragment = document.create_document_fragment();
        for node in nodes {
            fragment
                .append_child(node)
                .map_err(|e| format!("append_child failed: {:?}", e))?;
        }
        range
            .insert_node(&fragment)
            .map_err(|e| format!("insert_node failed: {:?}", e).into())
    }

    fn select_after(&self, range: &Range, node: &Node) -> Result<(), PlatformError> {
        let caret = range.clone_range();
        caret
            .set_start_after(node)
            .map_err(|e| format!("set_start_after failed: {:?}", e))?;
        caret.collapse_with_to_start(true);
        self.replace_selection(&caret)
    }

    fn select_collapsed(&self, node: &Node, offset: u32) -> Result<(), PlatformError> {
        let document = document().ok_or("no document")?;
        let range = document
            .create_range()
            .map_err(|e| format!("create_range failed: {:?}", e))?;
        range
            .set_start(node, offset)
            .map_err(|e| format!("set_start failed: {:?}", e))?;
        range
            .set_end(node, offset)
            .map_err(|e| format!("set_end failed: {:?}", e))?;
        self.replace_selection(&range)
    }
}
