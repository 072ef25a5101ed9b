//! html5ever adapter feeding the arena.
//!
//! The tokenizer/parser itself is an external collaborator: this module
//! only implements the `TreeSink` glue that lets html5ever build a
//! [`Document`] directly, plus the entry points for caller-supplied parse
//! results. Entities are resolved and tag/attribute casing normalized by
//! html5ever before anything reaches the arena.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as Html5Attribute, ExpandedName, LocalName, Namespace, QualName};

use super::{Document, NodeData, NodeId};

/// Result of a parser invocation: either a whole document tree or a bare
/// element subtree. A bare subtree is wrapped in a synthetic
/// `html`/`body` shell by [`into_document`].
pub enum ParsedInput {
    Document(Document),
    Fragment(Document, NodeId),
}

/// Caller-supplied alternate parser with the `(html) -> tree` contract.
pub type ParserFn = dyn Fn(&str) -> ParsedInput;

/// Parse an HTML string into a [`Document`] with the built-in adapter.
pub fn parse_html(html: &str) -> Document {
    let sink = Sink::new();
    let sink = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    sink.into_document()
}

/// Normalize a [`ParsedInput`] into a full document. Fragments get a
/// synthetic `html`/`body` shell around the bare node.
pub fn into_document(input: ParsedInput) -> Document {
    match input {
        ParsedInput::Document(doc) => doc,
        ParsedInput::Fragment(mut doc, node) => {
            doc.detach(node);
            let root = doc.create_element("html");
            let body = doc.create_element("body");
            doc.append(root, body);
            doc.append(body, node);
            doc.set_root(root);
            doc.set_body(body);
            doc
        }
    }
}

/// TreeSink building the arena. Comments, doctypes, and processing
/// instructions are allocated but never linked, so the finished tree holds
/// only element and text nodes.
struct Sink {
    doc: Document,
    names: HashMap<NodeId, QualName>,
    ignored: HashSet<NodeId>,
    unnamed: QualName,
}

impl Sink {
    fn new() -> Self {
        Self {
            doc: Document::with_document_node(),
            names: HashMap::new(),
            ignored: HashSet::new(),
            unnamed: QualName::new(None, Namespace::from(""), LocalName::from("")),
        }
    }

    /// Promote the parsed `html`/`body` elements to document root/body.
    /// html5ever synthesizes both even for bare fragments, but missing ones
    /// are created anyway so the [`Document`] invariant holds regardless.
    fn into_document(mut self) -> Document {
        let container = self.doc.root();
        let root = self
            .doc
            .children(container)
            .into_iter()
            .find(|&c| self.doc.has_tag(c, "html"))
            .unwrap_or_else(|| {
                let root = self.doc.create_element("html");
                self.doc.append(container, root);
                root
            });
        let body = self
            .doc
            .children(root)
            .into_iter()
            .find(|&c| self.doc.has_tag(c, "body"))
            .unwrap_or_else(|| {
                let body = self.doc.create_element("body");
                self.doc.append(root, body);
                body
            });
        self.doc.set_root(root);
        self.doc.set_body(body);
        self.doc
    }

    fn append_child(&mut self, parent: NodeId, child: NodeOrText<NodeId>) {
        match child {
            NodeOrText::AppendNode(node) => {
                if !self.ignored.contains(&node) {
                    self.doc.append(parent, node);
                }
            }
            NodeOrText::AppendText(text) => {
                // Adjacent text runs from the tokenizer collapse into one
                // node, mirroring what a browser DOM would hold.
                if let Some(last) = self.doc.children(parent).last().copied() {
                    if let NodeData::Text(_) = self.doc.data(last) {
                        self.push_text(last, &text);
                        return;
                    }
                }
                let node = self.doc.create_text(&text);
                self.doc.append(parent, node);
            }
        }
    }

    fn push_text(&mut self, id: NodeId, extra: &str) {
        if let NodeData::Text(existing) = self.doc.data_mut(id) {
            existing.push_str(extra);
        }
    }
}

impl TreeSink for Sink {
    type Handle = NodeId;
    type Output = Sink;

    fn finish(self) -> Self::Output {
        self
    }

    fn parse_error(&mut self, _msg: Cow<'static, str>) {
        // Lenient, like a browser.
    }

    fn get_document(&mut self) -> NodeId {
        self.doc.root()
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> ExpandedName<'a> {
        self.names.get(target).unwrap_or(&self.unnamed).expanded()
    }

    fn create_element(
        &mut self,
        name: QualName,
        attrs: Vec<Html5Attribute>,
        _flags: ElementFlags,
    ) -> NodeId {
        let id = self.doc.create_element(&name.local);
        for attr in attrs {
            let attr_name = attr.name.local.to_string();
            // First write wins on duplicate keys.
            if self.doc.attr(id, &attr_name).is_none() {
                self.doc.set_attribute(id, &attr_name, &attr.value);
            }
        }
        self.names.insert(id, name);
        id
    }

    fn create_comment(&mut self, _text: StrTendril) -> NodeId {
        let id = self.doc.create_text("");
        self.ignored.insert(id);
        id
    }

    fn create_pi(&mut self, _target: StrTendril, _data: StrTendril) -> NodeId {
        let id = self.doc.create_text("");
        self.ignored.insert(id);
        id
    }

    fn append(&mut self, parent: &NodeId, child: NodeOrText<NodeId>) {
        self.append_child(*parent, child);
    }

    fn append_based_on_parent_node(
        &mut self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        if let Some(parent) = self.doc.parent(*element) {
            self.append_child(parent, child);
        } else {
            self.append_child(*prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &mut self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn get_template_contents(&mut self, target: &NodeId) -> NodeId {
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&mut self, _mode: QuirksMode) {}

    fn append_before_sibling(&mut self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
        match new_node {
            NodeOrText::AppendNode(node) => {
                if !self.ignored.contains(&node) {
                    self.doc.insert_before(*sibling, node);
                }
            }
            NodeOrText::AppendText(text) => {
                let node = self.doc.create_text(&text);
                self.doc.insert_before(*sibling, node);
            }
        }
    }

    fn add_attrs_if_missing(&mut self, target: &NodeId, attrs: Vec<Html5Attribute>) {
        for attr in attrs {
            let attr_name = attr.name.local.to_string();
            if self.doc.attr(*target, &attr_name).is_none() {
                self.doc.set_attribute(*target, &attr_name, &attr.value);
            }
        }
    }

    fn remove_from_parent(&mut self, target: &NodeId) {
        self.doc.detach(*target);
    }

    fn reparent_children(&mut self, node: &NodeId, new_parent: &NodeId) {
        self.doc.reparent_children(*node, *new_parent);
    }
}
