//! Raw accessibility tree construction.

use crate::dom::{Document, NodeData, NodeId};
use crate::utils;

use super::{AriaNode, AriaRole, AriaTree};

/// Name-from-content truncation: 47 characters plus an ellipsis.
const NAME_TRUNCATE: usize = 47;

/// Maximum paragraph/div text length adopted as an accessible name.
const SHORT_TEXT_NAME: usize = 100;

/// Build the raw tree for the document body. Invisible elements are
/// skipped outright; children that are nameless, generic, and childless
/// are pruned during the same pass.
pub fn build_aria_tree(doc: &Document) -> AriaTree {
    let root = build_element(doc, doc.body()).unwrap_or_else(|| AriaNode::new(AriaRole::Document));
    AriaTree::new(root)
}

/// Tags with no accessibility presence at all. The snapshot is built from
/// the raw tree (navigation and chrome matter to it), so script content
/// must be excluded here rather than by the preprocessor.
const IGNORED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title", "meta", "link"];

fn build_element(doc: &Document, id: NodeId) -> Option<AriaNode> {
    if !doc.is_visible(id) {
        return None;
    }
    let el = doc.element(id)?;
    if IGNORED_TAGS.contains(&el.tag.as_str()) {
        return None;
    }

    let (kind, role) = resolve_role(doc, id, &el.tag);
    let mut node = AriaNode::new(kind);
    node.role = role;
    node.origin = Some(id);

    if kind == AriaRole::Heading {
        node.level = heading_level(doc, id, &el.tag);
    }
    node.checked = tristate(doc, id, "checked", "aria-checked");
    node.selected = tristate(doc, id, "selected", "aria-selected");
    node.expanded = doc
        .attr(id, "aria-expanded")
        .map(|v| v.eq_ignore_ascii_case("true"));
    node.disabled = doc.attr(id, "disabled").is_some()
        || doc
            .attr(id, "aria-disabled")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    node.required = doc.attr(id, "required").is_some()
        || doc
            .attr(id, "aria-required")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    node.value = doc
        .attr(id, "value")
        .or_else(|| doc.attr(id, "aria-valuenow"))
        .map(str::to_string)
        .filter(|v| !v.is_empty());

    let name_from_text = compute_name(doc, id, kind, &mut node);

    for child in doc.children(id) {
        // A name computed from content already covers every descendant
        // text run; only embedded images still carry information of their
        // own.
        if name_from_text {
            if doc.has_tag(child, "img") {
                if let Some(built) = build_element(doc, child) {
                    node.children.push(built);
                }
            }
            continue;
        }
        match doc.data(child) {
            NodeData::Element(_) => {
                if let Some(built) = build_element(doc, child) {
                    node.children.push(built);
                }
            }
            NodeData::Text(text) => {
                let normalized = utils::normalize_whitespace(text);
                if !normalized.is_empty() {
                    node.children.push(AriaNode::text(normalized));
                }
            }
        }
    }

    // Prune what carries no information at all.
    node.children
        .retain(|child| child.name.is_some() || child.kind != AriaRole::Generic || !child.children.is_empty());

    if node.name.is_none() && node.kind == AriaRole::Generic && node.children.is_empty() {
        return None;
    }

    Some(node)
}

/// Explicit `role` attribute (first recognized token) wins; otherwise the
/// implicit role table.
fn resolve_role(doc: &Document, id: NodeId, tag: &str) -> (AriaRole, String) {
    if let Some(role_attr) = doc.attr(id, "role") {
        for token in role_attr.split_whitespace() {
            if let Some(kind) = AriaRole::from_token(token) {
                return (kind, token.to_ascii_lowercase());
            }
        }
    }
    let kind = implicit_role(doc, id, tag);
    (kind, kind.as_str().to_string())
}

/// Implicit tag→role table, with the `input[type]` sub-switch.
fn implicit_role(doc: &Document, id: NodeId, tag: &str) -> AriaRole {
    match tag {
        "a" => {
            if doc.attr(id, "href").is_some() {
                AriaRole::Link
            } else {
                AriaRole::Generic
            }
        }
        "article" => AriaRole::Article,
        "aside" => AriaRole::Complementary,
        "blockquote" => AriaRole::Blockquote,
        "button" => AriaRole::Button,
        "caption" | "figcaption" => AriaRole::Caption,
        "code" | "pre" => AriaRole::Code,
        "dd" => AriaRole::Definition,
        "del" | "s" => AriaRole::Deletion,
        "dialog" => AriaRole::Dialog,
        "em" | "i" => AriaRole::Emphasis,
        "fieldset" => AriaRole::Group,
        "figure" => AriaRole::Figure,
        "footer" => AriaRole::ContentInfo,
        "form" => AriaRole::Form,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => AriaRole::Heading,
        "header" => AriaRole::Banner,
        "hr" => AriaRole::Separator,
        "img" => AriaRole::Img,
        "input" => input_role(doc, id),
        "ins" => AriaRole::Insertion,
        "label" => AriaRole::Generic,
        "li" => AriaRole::ListItem,
        "main" => AriaRole::Main,
        "mark" => AriaRole::Mark,
        "nav" => AriaRole::Navigation,
        "ol" | "ul" | "dl" => AriaRole::List,
        "option" => AriaRole::Option,
        "output" => AriaRole::Status,
        "p" => AriaRole::Paragraph,
        "progress" => AriaRole::ProgressBar,
        "search" => AriaRole::Search,
        "section" => AriaRole::Region,
        "select" => AriaRole::Combobox,
        "strong" | "b" => AriaRole::Strong,
        "sub" => AriaRole::Subscript,
        "sup" => AriaRole::Superscript,
        "table" => AriaRole::Table,
        "tbody" | "thead" | "tfoot" => AriaRole::RowGroup,
        "td" => AriaRole::Cell,
        "textarea" => AriaRole::TextBox,
        "th" => AriaRole::ColumnHeader,
        "time" => AriaRole::Time,
        "tr" => AriaRole::Row,
        _ => AriaRole::Generic,
    }
}

fn input_role(doc: &Document, id: NodeId) -> AriaRole {
    match doc
        .attr(id, "type")
        .unwrap_or("text")
        .to_ascii_lowercase()
        .as_str()
    {
        "checkbox" => AriaRole::Checkbox,
        "radio" => AriaRole::Radio,
        "range" => AriaRole::Slider,
        "number" => AriaRole::SpinButton,
        "search" => AriaRole::SearchBox,
        "button" | "submit" | "reset" | "image" => AriaRole::Button,
        _ => AriaRole::TextBox,
    }
}

fn heading_level(doc: &Document, id: NodeId, tag: &str) -> Option<u8> {
    if let Some(level) = doc.attr(id, "aria-level").and_then(|v| v.parse().ok()) {
        return Some(level);
    }
    tag.strip_prefix('h').and_then(|n| n.parse().ok())
}

fn tristate(doc: &Document, id: NodeId, attr: &str, aria_attr: &str) -> Option<bool> {
    if doc.attr(id, attr).is_some() {
        return Some(true);
    }
    doc.attr(id, aria_attr).map(|v| v.eq_ignore_ascii_case("true"))
}

/// Accessible name: `aria-label` → `alt` (images) → `title` → truncated
/// text content for name-from-content roles → short paragraph/div text.
/// Returns whether the name consumed the element's own text.
fn compute_name(doc: &Document, id: NodeId, kind: AriaRole, node: &mut AriaNode) -> bool {
    if let Some(label) = doc.attr(id, "aria-label") {
        let label = label.trim();
        if !label.is_empty() {
            node.name = Some(label.to_string());
            return false;
        }
    }
    if kind == AriaRole::Img {
        if let Some(alt) = doc.attr(id, "alt") {
            let alt = alt.trim();
            if !alt.is_empty() {
                node.name = Some(alt.to_string());
                return false;
            }
        }
    }
    if let Some(title) = doc.attr(id, "title") {
        let title = title.trim();
        if !title.is_empty() {
            node.name = Some(title.to_string());
            return false;
        }
    }

    if names_from_content(kind) {
        let text = doc.normalized_text(id);
        if !text.is_empty() {
            node.name = Some(truncate_name(&text));
            return true;
        }
        return false;
    }

    if matches!(kind, AriaRole::Paragraph | AriaRole::Generic) {
        let has_element_children = !doc.child_elements(id).is_empty();
        if !has_element_children {
            let text = doc.normalized_text(id);
            if !text.is_empty() && text.chars().count() < SHORT_TEXT_NAME {
                node.name = Some(text);
                return true;
            }
        }
    }

    false
}

fn names_from_content(kind: AriaRole) -> bool {
    matches!(
        kind,
        AriaRole::Heading
            | AriaRole::Link
            | AriaRole::Button
            | AriaRole::Option
            | AriaRole::Cell
            | AriaRole::ColumnHeader
            | AriaRole::RowHeader
    )
}

fn truncate_name(text: &str) -> String {
    if text.chars().count() <= NAME_TRUNCATE {
        return text.to_string();
    }
    let truncated: String = text.chars().take(NAME_TRUNCATE).collect();
    format!("{}...", truncated.trim_end())
}
