//! Arena-backed document tree.
//!
//! Every other component of the crate operates on this model. Nodes live in
//! a single `Vec` owned by [`Document`] and are addressed by [`NodeId`]
//! handles; the child→parent edge is a plain handle, so upward traversal
//! never creates an ownership cycle. Detaching a node unlinks it from its
//! parent's child list but leaves it in the arena — existing handles stay
//! valid, the subtree simply becomes unreachable from the root.
//!
//! The model supports the one traversal pattern the analysis passes lean on
//! heavily: a forward document-order sweep that may delete the node it is
//! currently standing on. [`Cursor`] computes the structural successor
//! (next sibling, else the nearest ancestor's next sibling) *before*
//! detaching, so iteration order is preserved as if the removal had not
//! happened.

pub mod parse;

use url::Url;

/// Handle addressing a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single attribute. Duplicate keys are impossible; the first write wins
/// during parsing and [`Document::set_attribute`] replaces in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Payload of an element node.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name, stored lowercase.
    pub tag: String,
    pub attrs: Vec<Attribute>,
    /// Cached `id` attribute.
    pub id: Option<String>,
    /// Cached `class` attribute.
    pub class: Option<String>,
    /// Scoring record, attached lazily the first time this element becomes
    /// a candidate. Accumulates by addition only and is never removed
    /// before the extraction call ends.
    pub content_score: Option<f64>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attrs: Vec::new(),
            id: None,
            class: None,
            content_score: None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Concatenated class + id, the match string for keyword heuristics.
    pub fn match_string(&self) -> String {
        let mut s = String::new();
        if let Some(class) = &self.class {
            s.push_str(class);
        }
        if let Some(id) = &self.id {
            if !s.is_empty() {
                s.push(' ');
            }
            s.push_str(id);
        }
        s
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// An in-memory document tree, created once per extraction call.
///
/// Invariant: [`Document::body`] is reachable from [`Document::root`]
/// through the children chain.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    base_url: Option<Url>,
}

impl Document {
    /// Arena holding a single `#document` container, the append target for
    /// the parser sink. [`parse`] promotes the parsed `html`/`body` pair to
    /// root/body afterwards.
    pub(crate) fn with_document_node() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            base_url: None,
        };
        let container = doc.create_element("#document");
        doc.root = container;
        doc.body = container;
        doc
    }

    /// Create an empty document with a synthetic `html`/`body` shell.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            base_url: None,
        };
        let root = doc.create_element("html");
        let body = doc.create_element("body");
        doc.append(root, body);
        doc.root = root;
        doc.body = body;
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn set_base_url(&mut self, url: Url) {
        self.base_url = Some(url);
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn set_body(&mut self, body: NodeId) {
        self.body = body;
    }

    // ---- construction ----

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    // ---- accessors ----

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()].data
    }

    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()].data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.index()].data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.index()].data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.index()].data, NodeData::Element(_))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let name_lower = name.to_lowercase();
        if let Some(el) = self.element_mut(id) {
            match name_lower.as_str() {
                "id" => el.id = Some(value.to_string()),
                "class" => el.class = Some(value.to_string()),
                _ => {}
            }
            if let Some(attr) = el
                .attrs
                .iter_mut()
                .find(|a| a.name.eq_ignore_ascii_case(&name_lower))
            {
                attr.value = value.to_string();
            } else {
                el.attrs.push(Attribute {
                    name: name_lower,
                    value: value.to_string(),
                });
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].first_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].next_sibling
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].prev_sibling
    }

    /// Number of nodes ever allocated, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Elements reachable from the root. This is what the parse guard
    /// compares against `max_elems_to_parse`.
    pub fn element_count(&self) -> usize {
        let mut count = usize::from(self.is_element(self.root));
        let mut cursor = self.first_child(self.root);
        while let Some(id) = cursor {
            if self.is_element(id) {
                count += 1;
            }
            cursor = self.next_in_order(id, self.root);
        }
        count
    }

    // ---- traversal ----

    /// Direct children in order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.first_child(id);
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.next_sibling(child);
        }
        out
    }

    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .into_iter()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    /// Next node in document order within the subtree rooted at `scope`:
    /// first child, else next sibling, else the nearest ancestor's next
    /// sibling. Returns `None` once the sweep leaves `scope`.
    pub fn next_in_order(&self, id: NodeId, scope: NodeId) -> Option<NodeId> {
        if let Some(child) = self.first_child(id) {
            return Some(child);
        }
        self.next_skipping_children(id, scope)
    }

    /// Document-order successor that does not descend into `id`.
    pub fn next_skipping_children(&self, id: NodeId, scope: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if current == scope {
                return None;
            }
            if let Some(sib) = self.next_sibling(current) {
                return Some(sib);
            }
            current = self.parent(current)?;
        }
    }

    /// Ancestors from the parent upward, nearest first, at most `max_depth`
    /// levels (`0` = unlimited).
    pub fn ancestors(&self, id: NodeId, max_depth: usize) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(ancestor) = cursor {
            out.push(ancestor);
            if max_depth != 0 && out.len() >= max_depth {
                break;
            }
            cursor = self.parent(ancestor);
        }
        out
    }

    /// Elements by tag under `scope`, depth-first, self-inclusive,
    /// case-insensitive. `"*"` matches every element.
    pub fn elements_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        let wildcard = tag == "*";
        let mut out = Vec::new();
        if self.is_element(scope) && (wildcard || self.has_tag(scope, tag)) {
            out.push(scope);
        }
        let mut cursor = self.first_child(scope);
        while let Some(id) = cursor {
            if self.is_element(id) && (wildcard || self.has_tag(id, tag)) {
                out.push(id);
            }
            cursor = self.next_in_order(id, scope);
        }
        out
    }

    /// Whether `maybe_ancestor` is `id` itself or one of its ancestors.
    pub fn contains(&self, maybe_ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == maybe_ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    // ---- visibility ----

    /// Absence of `display:none` / `visibility:hidden` inline style, the
    /// `hidden` attribute, and `aria-hidden="true"`. `aria-hidden` on the
    /// body itself is ignored — a page that hides `<body>` from assistive
    /// tech still renders.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let Some(el) = self.element(id) else {
            return true;
        };
        if let Some(style) = el.attr("style") {
            if crate::constants::REGEXPS.hidden_style.is_match(style) {
                return false;
            }
        }
        if el.attr("hidden").is_some() {
            return false;
        }
        if id != self.body {
            if let Some(aria) = el.attr("aria-hidden") {
                if aria.eq_ignore_ascii_case("true") {
                    return false;
                }
            }
        }
        true
    }

    // ---- text ----

    /// Concatenated text of all text descendants (and of `id` itself when
    /// it is a text node), in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeData::Text(text) = self.data(id) {
            out.push_str(text);
        }
        let mut cursor = self.first_child(id);
        while let Some(node) = cursor {
            if let NodeData::Text(text) = self.data(node) {
                out.push_str(text);
            }
            cursor = self.next_in_order(node, id);
        }
        out
    }

    /// Trimmed text with runs of whitespace collapsed to single spaces.
    pub fn normalized_text(&self, id: NodeId) -> String {
        crate::utils::normalize_whitespace(&self.text_content(id))
    }

    /// Character count of the normalized text.
    pub fn char_count(&self, id: NodeId) -> usize {
        self.normalized_text(id).chars().count()
    }

    // ---- mutation ----

    /// Unlink `id` from its parent's child list. The node and its subtree
    /// stay in the arena; handles remain valid.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        match prev {
            Some(prev) => self.nodes[prev.index()].next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.index()].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next.index()].prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.index()].last_child = prev;
                }
            }
        }
        let node = &mut self.nodes[id.index()];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous position first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        debug_assert_ne!(parent, child);
        self.detach(child);
        let last = self.nodes[parent.index()].last_child;
        match last {
            Some(last) => {
                self.nodes[last.index()].next_sibling = Some(child);
                self.nodes[child.index()].prev_sibling = Some(last);
            }
            None => self.nodes[parent.index()].first_child = Some(child),
        }
        self.nodes[parent.index()].last_child = Some(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Insert `new` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, new: NodeId) {
        debug_assert_ne!(sibling, new);
        self.detach(new);
        let (parent, prev) = {
            let node = &self.nodes[sibling.index()];
            (node.parent, node.prev_sibling)
        };
        let Some(parent) = parent else {
            return;
        };
        match prev {
            Some(prev) => {
                self.nodes[prev.index()].next_sibling = Some(new);
                self.nodes[new.index()].prev_sibling = Some(prev);
            }
            None => self.nodes[parent.index()].first_child = Some(new),
        }
        self.nodes[new.index()].next_sibling = Some(sibling);
        self.nodes[sibling.index()].prev_sibling = Some(new);
        self.nodes[new.index()].parent = Some(parent);
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let children = self.children(from);
        for child in children {
            self.append(to, child);
        }
    }

    /// Replace `old` with `new` at the same tree position. `old` is
    /// detached; its children stay with it.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.insert_before(old, new);
        self.detach(old);
    }

    /// Rename an element's tag in place, keeping attributes and children.
    pub fn retag(&mut self, id: NodeId, tag: &str) {
        if let Some(el) = self.element_mut(id) {
            el.tag = tag.to_lowercase();
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward document-order sweep with first-class removal.
///
/// `advance()` moves to the next node; `remove_advance()` detaches the
/// current node and moves to the node that would have followed it had it
/// not been removed. The successor is computed from the pre-mutation
/// structure, so removal mid-sweep never skips or revisits nodes.
pub struct Cursor {
    scope: NodeId,
    current: Option<NodeId>,
}

impl Cursor {
    /// A sweep over the subtree rooted at `scope`, starting at `scope`
    /// itself.
    pub fn new(scope: NodeId) -> Self {
        Self {
            scope,
            current: Some(scope),
        }
    }

    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Step into the next node in document order.
    pub fn advance(&mut self, doc: &Document) -> Option<NodeId> {
        self.current = self.current.and_then(|id| doc.next_in_order(id, self.scope));
        self.current
    }

    /// Step over the current node without descending into it.
    pub fn advance_skipping_children(&mut self, doc: &Document) -> Option<NodeId> {
        self.current = self
            .current
            .and_then(|id| doc.next_skipping_children(id, self.scope));
        self.current
    }

    /// Re-point the sweep at `id`, e.g. after replacing the current node
    /// with another that should be visited in its place.
    pub fn jump(&mut self, id: NodeId) {
        self.current = Some(id);
    }

    /// Detach the current node and continue the sweep at its structural
    /// successor.
    pub fn remove_advance(&mut self, doc: &mut Document) -> Option<NodeId> {
        if let Some(id) = self.current {
            let next = doc.next_skipping_children(id, self.scope);
            doc.detach(id);
            self.current = next;
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.create_element("div");
        let p = doc.create_element("p");
        let text = doc.create_text("hello world");
        doc.append(body, div);
        doc.append(div, p);
        doc.append(p, text);
        (doc, div, p, text)
    }

    #[test]
    fn append_links_siblings() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.create_element("p");
        let b = doc.create_element("p");
        doc.append(body, a);
        doc.append(body, b);
        assert_eq!(doc.children(body), vec![a, b]);
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.prev_sibling(b), Some(a));
        assert_eq!(doc.parent(b), Some(body));
    }

    #[test]
    fn detach_unlinks_but_preserves_handles() {
        let (mut doc, div, p, _) = sample();
        doc.detach(p);
        assert!(doc.children(div).is_empty());
        assert_eq!(doc.parent(p), None);
        // The subtree is intact under the detached node.
        assert_eq!(doc.text_content(p), "hello world");
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let (mut doc, div, _, _) = sample();
        let extra = doc.create_text(" again");
        doc.append(div, extra);
        assert_eq!(doc.text_content(div), "hello world again");
    }

    #[test]
    fn elements_by_tag_is_self_inclusive_and_case_insensitive() {
        let (doc, div, p, _) = sample();
        assert_eq!(doc.elements_by_tag(div, "DIV"), vec![div]);
        assert_eq!(doc.elements_by_tag(div, "p"), vec![p]);
        assert_eq!(doc.elements_by_tag(div, "*"), vec![div, p]);
    }

    #[test]
    fn cursor_removal_continues_at_structural_successor() {
        let mut doc = Document::new();
        let body = doc.body();
        let first = doc.create_element("div");
        let inner = doc.create_element("p");
        let second = doc.create_element("section");
        doc.append(body, first);
        doc.append(first, inner);
        doc.append(body, second);

        let mut cursor = Cursor::new(body);
        cursor.advance(&doc); // first
        assert_eq!(cursor.current(), Some(first));
        // Removing `first` must land on `second`, not on the now-detached
        // `inner`.
        assert_eq!(cursor.remove_advance(&mut doc), Some(second));
        assert_eq!(doc.children(body), vec![second]);
    }

    #[test]
    fn ancestors_respects_depth_limit() {
        let (doc, div, p, text) = sample();
        let all = doc.ancestors(text, 0);
        assert_eq!(all[0], p);
        assert_eq!(all[1], div);
        assert_eq!(doc.ancestors(text, 2), vec![p, div]);
    }

    #[test]
    fn hidden_nodes_are_invisible() {
        let mut doc = Document::new();
        let body = doc.body();
        let styled = doc.create_element("div");
        doc.set_attribute(styled, "style", "display: none");
        let hidden = doc.create_element("div");
        doc.set_attribute(hidden, "hidden", "");
        let aria = doc.create_element("div");
        doc.set_attribute(aria, "aria-hidden", "true");
        let plain = doc.create_element("div");
        for id in [styled, hidden, aria, plain] {
            doc.append(body, id);
        }
        assert!(!doc.is_visible(styled));
        assert!(!doc.is_visible(hidden));
        assert!(!doc.is_visible(aria));
        assert!(doc.is_visible(plain));
    }

    #[test]
    fn retag_keeps_children() {
        let (mut doc, div, _, _) = sample();
        doc.retag(div, "P");
        assert_eq!(doc.tag(div), Some("p"));
        assert_eq!(doc.text_content(div), "hello world");
    }

    #[test]
    fn element_count_ignores_detached_subtrees() {
        let (mut doc, div, _, _) = sample();
        // html + body + div + p
        assert_eq!(doc.element_count(), 4);
        doc.detach(div);
        assert_eq!(doc.element_count(), 2);
    }
}
