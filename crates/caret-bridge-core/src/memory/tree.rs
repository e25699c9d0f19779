//! Arena node tree with DOM boundary-point and range semantics.
//!
//! Offsets inside text nodes count Unicode scalar values rather than UTF-16
//! code units; everything else behaves like the DOM: element offsets are child
//! indices, inserting at a text offset splits the text node, and deleting a
//! range trims partially contained text and removes fully contained nodes.

use smol_str::SmolStr;

use crate::platform::PlatformError;

/// Handle to a node in a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element {
        tag: SmolStr,
        attrs: Vec<(SmolStr, String)>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// A position in the tree: a node plus an offset inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Start and end boundary points of a selection range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRange {
    pub start: Boundary,
    pub end: Boundary,
}

impl MemoryRange {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    /// A caret: both boundaries at the same point.
    pub fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Node arena rooted at a document node.
///
/// The tree can hold one live range. Like a DOM selection range it follows
/// every mutation: splitting text, inserting and removing children and
/// deleting characters all move its boundaries the way the DOM does.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<NodeData>,
    live: Option<MemoryRange>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            live: None,
        }
    }

    pub fn live_range(&self) -> Option<MemoryRange> {
        self.live
    }

    pub fn set_live_range(&mut self, range: Option<MemoryRange>) {
        self.live = range;
    }

    fn remap_live(&mut self, f: impl Fn(&Self, Boundary) -> Boundary) {
        if let Some(range) = self.live {
            self.live = Some(MemoryRange::new(f(self, range.start), f(self, range.end)));
        }
    }

    /// The document node every attached node descends from.
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            parent: None,
            children: Vec::new(),
            kind,
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached element. Tag and attribute names are lowercased.
    pub fn create_element(&mut self, tag: &str, attrs: Vec<(SmolStr, String)>) -> NodeId {
        let attrs = attrs
            .into_iter()
            .map(|(name, value)| (SmolStr::new(name.to_ascii_lowercase()), value))
            .collect();
        self.push(NodeKind::Element {
            tag: SmolStr::new(tag.to_ascii_lowercase()),
            attrs,
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Tag name, for element nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    /// Length of a node for boundary purposes: chars for text, children otherwise.
    pub fn node_len(&self, id: NodeId) -> usize {
        match self.kind(id) {
            NodeKind::Text(text) => text.chars().count(),
            _ => self.children(id).len(),
        }
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Whether the node is connected to the document.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == self.document()
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Remove a node from its parent. No-op for detached nodes.
    pub fn detach(&mut self, id: NodeId) {
        let (Some(parent), Some(index)) = (self.parent(id), self.index_in_parent(id)) else {
            return;
        };
        self.remap_live(|tree, b| {
            if tree.is_inclusive_descendant(b.node, id) {
                Boundary::new(parent, index)
            } else if b.node == parent && b.offset > index {
                Boundary::new(parent, b.offset - 1)
            } else {
                b
            }
        });
        self.nodes[id.0].parent = None;
        self.nodes[parent.0].children.remove(index);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Insert `child` into `parent` at `index`, detaching it from any previous parent.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let index = index.min(self.children(parent).len());
        self.remap_live(|_, b| {
            if b.node == parent && b.offset > index {
                Boundary::new(parent, b.offset + 1)
            } else {
                b
            }
        });
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// First attached element whose `id` attribute matches, in document order.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.document())
            .into_iter()
            .find(|&n| self.attribute(n, "id") == Some(id))
    }

    /// Descendants of `root` in document (pre-)order, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Split a text node at a char offset. The tail becomes a new sibling
    /// right after it (or a detached node when the text has no parent).
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, PlatformError> {
        let NodeKind::Text(text) = &mut self.nodes[id.0].kind else {
            return Err("split_text on a non-text node".into());
        };
        let offset = offset.min(text.chars().count());
        let byte = char_to_byte(text, offset);
        let tail = text.split_off(byte);
        let new = self.create_text(tail);

        self.remap_live(|_, b| {
            if b.node == id && b.offset > offset {
                Boundary::new(new, b.offset - offset)
            } else {
                b
            }
        });
        if let (Some(parent), Some(index)) = (self.parent(id), self.index_in_parent(id)) {
            self.insert_child(parent, index + 1, new);
            self.remap_live(|_, b| {
                if b.node == parent && b.offset == index + 1 {
                    Boundary::new(parent, b.offset + 1)
                } else {
                    b
                }
            });
        }
        Ok(new)
    }

    /// Insert `nodes`, in order, at a boundary point.
    ///
    /// Returns the parent and child index the first node ended up at.
    pub fn insert_at(
        &mut self,
        at: Boundary,
        nodes: &[NodeId],
    ) -> Result<(NodeId, usize), PlatformError> {
        let (parent, index) = if self.is_text(at.node) {
            let parent = self
                .parent(at.node)
                .ok_or("cannot insert into a detached text node")?;
            let tail = self.split_text(at.node, at.offset)?;
            let index = self
                .index_in_parent(tail)
                .ok_or("split text lost its parent")?;
            (parent, index)
        } else {
            (at.node, at.offset.min(self.children(at.node).len()))
        };

        for (k, &node) in nodes.iter().enumerate() {
            if self.is_inclusive_descendant(parent, node) {
                return Err("cannot insert a node into itself".into());
            }
            self.insert_child(parent, index + k, node);
        }
        Ok((parent, index))
    }

    /// Boundary point right after `node` in its parent.
    pub fn after(&self, node: NodeId) -> Option<Boundary> {
        let parent = self.parent(node)?;
        let index = self.index_in_parent(node)?;
        Some(Boundary::new(parent, index + 1))
    }

    /// Child indices from the top of the tree down to `id`.
    fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let (Some(parent), Some(index)) = (self.parent(current), self.index_in_parent(current))
        {
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Sort key of a boundary point. Comparing keys lexicographically matches
    /// DOM boundary-point ordering within one tree.
    fn boundary_key(&self, b: Boundary) -> Vec<usize> {
        let mut key = self.path(b.node);
        key.push(b.offset);
        key
    }

    /// Delete everything between the range boundaries.
    ///
    /// Returns the collapsed boundary the range ends up at.
    pub fn delete_contents(&mut self, range: MemoryRange) -> Boundary {
        let start_key = self.boundary_key(range.start);
        let end_key = self.boundary_key(range.end);
        if start_key >= end_key {
            return range.start;
        }

        if range.start.node == range.end.node && self.is_text(range.start.node) {
            self.remove_chars(range.start.node, range.start.offset, range.end.offset);
            return range.start;
        }

        let mut top = range.start.node;
        while let Some(parent) = self.parent(top) {
            top = parent;
        }

        let mut removals = Vec::new();
        let mut trims = Vec::new();
        self.collect_deletions(
            top,
            &start_key,
            &end_key,
            range,
            &mut removals,
            &mut trims,
        );

        for (node, from, to) in trims {
            self.remove_chars(node, from, to);
        }
        for node in removals {
            self.detach(node);
        }
        range.start
    }

    fn collect_deletions(
        &self,
        node: NodeId,
        start_key: &[usize],
        end_key: &[usize],
        range: MemoryRange,
        removals: &mut Vec<NodeId>,
        trims: &mut Vec<(NodeId, usize, usize)>,
    ) {
        let base = self.path(node);
        for (i, &child) in self.children(node).iter().enumerate() {
            let mut child_start = base.clone();
            child_start.push(i);
            let mut child_end = base.clone();
            child_end.push(i + 1);

            if child_end.as_slice() <= start_key || child_start.as_slice() >= end_key {
                continue;
            }
            if start_key <= child_start.as_slice() && child_end.as_slice() <= end_key {
                removals.push(child);
                continue;
            }

            if self.is_text(child) {
                let from = if range.start.node == child {
                    range.start.offset
                } else {
                    0
                };
                let to = if range.end.node == child {
                    range.end.offset
                } else {
                    self.node_len(child)
                };
                if from < to {
                    trims.push((child, from, to));
                }
            } else {
                self.collect_deletions(child, start_key, end_key, range, removals, trims);
            }
        }
    }

    fn remove_chars(&mut self, id: NodeId, from: usize, to: usize) {
        self.remap_live(|_, b| {
            if b.node != id || b.offset <= from {
                b
            } else if b.offset <= to {
                Boundary::new(id, from)
            } else {
                Boundary::new(id, b.offset - (to - from))
            }
        });
        if let NodeKind::Text(text) = &mut self.nodes[id.0].kind {
            let start = char_to_byte(text, from);
            let end = char_to_byte(text, to);
            if start < end {
                text.replace_range(start..end, "");
            }
        }
    }

    /// Boundary inside the text of `root` at the given char offset.
    ///
    /// Offsets past the end clamp to the end of the last text node; a subtree
    /// without text maps everything to the start of `root`.
    pub fn boundary_at_char(&self, root: NodeId, char_offset: usize) -> Boundary {
        let mut accumulated = 0;
        let mut last_text = None;

        for node in self.descendants(root) {
            let NodeKind::Text(text) = self.kind(node) else {
                continue;
            };
            let len = text.chars().count();
            if accumulated + len >= char_offset {
                return Boundary::new(node, char_offset - accumulated);
            }
            accumulated += len;
            last_text = Some((node, len));
        }

        match last_text {
            Some((node, len)) => Boundary::new(node, len),
            None => Boundary::new(root, 0),
        }
    }

    /// Column and line of `target` in a monospace flow of `root`'s text,
    /// where each `<br>` starts a new line.
    pub fn flow_position(&self, root: NodeId, target: NodeId) -> Option<(usize, usize)> {
        let mut column = 0;
        let mut line = 0;
        for node in self.descendants(root) {
            if node == target {
                return Some((column, line));
            }
            match self.kind(node) {
                NodeKind::Text(text) => column += text.chars().count(),
                NodeKind::Element { tag, .. } if tag == "br" => {
                    column = 0;
                    line += 1;
                }
                _ => {}
            }
        }
        None
    }
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(tree: &Tree, id: NodeId) -> &str {
        match tree.kind(id) {
            NodeKind::Text(t) => t,
            _ => panic!("not a text node"),
        }
    }

    fn root_with_text(tree: &mut Tree, text: &str) -> (NodeId, NodeId) {
        let root = tree.create_element("div", vec![]);
        let doc = tree.document();
        tree.append_child(doc, root);
        let t = tree.create_text(text);
        tree.append_child(root, t);
        (root, t)
    }

    #[test]
    fn test_split_text_inserts_sibling() {
        let mut tree = Tree::new();
        let (root, t) = root_with_text(&mut tree, "hello");
        let tail = tree.split_text(t, 2).unwrap();
        assert_eq!(text_of(&tree, t), "he");
        assert_eq!(text_of(&tree, tail), "llo");
        assert_eq!(tree.children(root), &[t, tail]);
    }

    #[test]
    fn test_split_text_counts_chars_not_bytes() {
        let mut tree = Tree::new();
        let (_, t) = root_with_text(&mut tree, "héllo");
        let tail = tree.split_text(t, 2).unwrap();
        assert_eq!(text_of(&tree, t), "hé");
        assert_eq!(text_of(&tree, tail), "llo");
    }

    #[test]
    fn test_delete_within_text() {
        let mut tree = Tree::new();
        let (_, t) = root_with_text(&mut tree, "helloWorld");
        let range = MemoryRange::new(Boundary::new(t, 2), Boundary::new(t, 5));
        let at = tree.delete_contents(range);
        assert_eq!(text_of(&tree, t), "heWorld");
        assert_eq!(at, Boundary::new(t, 2));
    }

    #[test]
    fn test_delete_across_elements() {
        // <div>ab<b>cd</b>ef</div>, delete from "a|b" to "e|f"
        let mut tree = Tree::new();
        let (root, ab) = root_with_text(&mut tree, "ab");
        let b = tree.create_element("b", vec![]);
        let cd = tree.create_text("cd");
        tree.append_child(b, cd);
        tree.append_child(root, b);
        let ef = tree.create_text("ef");
        tree.append_child(root, ef);

        let range = MemoryRange::new(Boundary::new(ab, 1), Boundary::new(ef, 1));
        tree.delete_contents(range);

        assert_eq!(tree.children(root), &[ab, ef]);
        assert_eq!(text_of(&tree, ab), "a");
        assert_eq!(text_of(&tree, ef), "f");
        assert!(!tree.is_attached(b));
    }

    #[test]
    fn test_delete_partially_contained_element() {
        // <div>ab<i>cd</i></div>, delete from "a|b" to "c|d"
        let mut tree = Tree::new();
        let (root, ab) = root_with_text(&mut tree, "ab");
        let i = tree.create_element("i", vec![]);
        let cd = tree.create_text("cd");
        tree.append_child(i, cd);
        tree.append_child(root, i);

        tree.delete_contents(MemoryRange::new(Boundary::new(ab, 1), Boundary::new(cd, 1)));

        assert_eq!(tree.children(root), &[ab, i]);
        assert_eq!(text_of(&tree, ab), "a");
        assert_eq!(text_of(&tree, cd), "d");
    }

    #[test]
    fn test_delete_collapsed_is_noop() {
        let mut tree = Tree::new();
        let (_, t) = root_with_text(&mut tree, "abc");
        let at = Boundary::new(t, 1);
        assert_eq!(tree.delete_contents(MemoryRange::collapsed(at)), at);
        assert_eq!(text_of(&tree, t), "abc");
    }

    #[test]
    fn test_insert_at_text_offset_splits() {
        let mut tree = Tree::new();
        let (root, t) = root_with_text(&mut tree, "abcd");
        let em = tree.create_element("em", vec![]);
        tree.insert_at(Boundary::new(t, 2), &[em]).unwrap();
        assert_eq!(tree.children(root).len(), 3);
        assert_eq!(tree.children(root)[1], em);
        assert_eq!(tree.after(em), Some(Boundary::new(root, 2)));
    }

    #[test]
    fn test_live_range_follows_mutations() {
        let mut tree = Tree::new();
        let (root, t) = root_with_text(&mut tree, "abcdef");
        tree.set_live_range(Some(MemoryRange::new(
            Boundary::new(t, 1),
            Boundary::new(t, 5),
        )));

        let tail = tree.split_text(t, 3).unwrap();
        let live = tree.live_range().unwrap();
        assert_eq!(live.start, Boundary::new(t, 1));
        assert_eq!(live.end, Boundary::new(tail, 2));

        // Deleting "de" from the tail pulls the end back to its start.
        tree.remove_chars(tail, 0, 2);
        assert_eq!(tree.live_range().unwrap().end, Boundary::new(tail, 0));

        // Removing the tail moves the end to where it was in the parent.
        tree.detach(tail);
        assert_eq!(tree.live_range().unwrap().end, Boundary::new(root, 1));
    }

    #[test]
    fn test_live_range_shifts_with_sibling_insertion() {
        let mut tree = Tree::new();
        let (root, _) = root_with_text(&mut tree, "ab");
        tree.set_live_range(Some(MemoryRange::collapsed(Boundary::new(root, 1))));

        let em = tree.create_element("em", Vec::new());
        tree.insert_child(root, 0, em);
        assert_eq!(
            tree.live_range(),
            Some(MemoryRange::collapsed(Boundary::new(root, 2)))
        );
    }

    #[test]
    fn test_insert_into_self_is_rejected() {
        let mut tree = Tree::new();
        let (root, _) = root_with_text(&mut tree, "x");
        assert!(tree.insert_at(Boundary::new(root, 0), &[root]).is_err());
    }

    #[test]
    fn test_boundary_at_char_walks_text_nodes() {
        let mut tree = Tree::new();
        let (root, ab) = root_with_text(&mut tree, "ab");
        let b = tree.create_element("b", vec![]);
        let cd = tree.create_text("cd");
        tree.append_child(b, cd);
        tree.append_child(root, b);

        assert_eq!(tree.boundary_at_char(root, 1), Boundary::new(ab, 1));
        assert_eq!(tree.boundary_at_char(root, 2), Boundary::new(ab, 2));
        assert_eq!(tree.boundary_at_char(root, 3), Boundary::new(cd, 1));
        assert_eq!(tree.boundary_at_char(root, 99), Boundary::new(cd, 2));
    }

    #[test]
    fn test_flow_position_breaks_on_br() {
        let mut tree = Tree::new();
        let (root, _) = root_with_text(&mut tree, "abc");
        let br = tree.create_element("br", vec![]);
        tree.append_child(root, br);
        let de = tree.create_text("de");
        tree.append_child(root, de);
        let marker = tree.create_element("span", vec![]);
        tree.insert_at(Boundary::new(de, 1), &[marker]).unwrap();

        assert_eq!(tree.flow_position(root, br), Some((3, 0)));
        assert_eq!(tree.flow_position(root, marker), Some((1, 1)));
    }
}
