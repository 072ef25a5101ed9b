//! Accessibility snapshot: a role-and-name tree summarizing page structure
//! independent of visual layout.
//!
//! Built when classification yields [`PageType::Other`] or when the caller
//! asks for it explicitly. The raw tree from [`build::build_aria_tree`] is
//! verbose; [`compress::compress`] folds it into a compact tree of the
//! same node type, and [`render::render_outline`] turns that into an
//! indented text outline with an optional link budget.
//!
//! [`PageType::Other`]: crate::PageType

pub mod build;
pub mod compress;
pub mod render;

pub use build::build_aria_tree;
pub use compress::compress;
pub use render::{render_outline, RenderOptions};

use crate::dom::NodeId;

/// Closed role enumeration: the ARIA roles the builder emits, plus `Text`
/// for raw text runs and `Generic` for everything unmapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    Article,
    Banner,
    Blockquote,
    Button,
    Caption,
    Cell,
    Checkbox,
    Code,
    ColumnHeader,
    Combobox,
    Complementary,
    ContentInfo,
    Definition,
    Deletion,
    Dialog,
    Document,
    Emphasis,
    Figure,
    Form,
    Generic,
    Group,
    Heading,
    Img,
    Insertion,
    Link,
    List,
    ListItem,
    Main,
    Mark,
    Navigation,
    Option,
    Paragraph,
    ProgressBar,
    Radio,
    Region,
    Row,
    RowGroup,
    RowHeader,
    Search,
    SearchBox,
    Separator,
    Slider,
    SpinButton,
    Status,
    Strong,
    Subscript,
    Superscript,
    Switch,
    Table,
    Text,
    TextBox,
    Time,
}

impl AriaRole {
    pub fn as_str(self) -> &'static str {
        match self {
            AriaRole::Article => "article",
            AriaRole::Banner => "banner",
            AriaRole::Blockquote => "blockquote",
            AriaRole::Button => "button",
            AriaRole::Caption => "caption",
            AriaRole::Cell => "cell",
            AriaRole::Checkbox => "checkbox",
            AriaRole::Code => "code",
            AriaRole::ColumnHeader => "columnheader",
            AriaRole::Combobox => "combobox",
            AriaRole::Complementary => "complementary",
            AriaRole::ContentInfo => "contentinfo",
            AriaRole::Definition => "definition",
            AriaRole::Deletion => "deletion",
            AriaRole::Dialog => "dialog",
            AriaRole::Document => "document",
            AriaRole::Emphasis => "emphasis",
            AriaRole::Figure => "figure",
            AriaRole::Form => "form",
            AriaRole::Generic => "generic",
            AriaRole::Group => "group",
            AriaRole::Heading => "heading",
            AriaRole::Img => "img",
            AriaRole::Insertion => "insertion",
            AriaRole::Link => "link",
            AriaRole::List => "list",
            AriaRole::ListItem => "listitem",
            AriaRole::Main => "main",
            AriaRole::Mark => "mark",
            AriaRole::Navigation => "navigation",
            AriaRole::Option => "option",
            AriaRole::Paragraph => "paragraph",
            AriaRole::ProgressBar => "progressbar",
            AriaRole::Radio => "radio",
            AriaRole::Region => "region",
            AriaRole::Row => "row",
            AriaRole::RowGroup => "rowgroup",
            AriaRole::RowHeader => "rowheader",
            AriaRole::Search => "search",
            AriaRole::SearchBox => "searchbox",
            AriaRole::Separator => "separator",
            AriaRole::Slider => "slider",
            AriaRole::SpinButton => "spinbutton",
            AriaRole::Status => "status",
            AriaRole::Strong => "strong",
            AriaRole::Subscript => "subscript",
            AriaRole::Superscript => "superscript",
            AriaRole::Switch => "switch",
            AriaRole::Table => "table",
            AriaRole::Text => "text",
            AriaRole::TextBox => "textbox",
            AriaRole::Time => "time",
        }
    }

    /// Parse an explicit `role` attribute token.
    pub fn from_token(token: &str) -> Option<Self> {
        let role = match token.to_ascii_lowercase().as_str() {
            "article" => AriaRole::Article,
            "banner" => AriaRole::Banner,
            "blockquote" => AriaRole::Blockquote,
            "button" => AriaRole::Button,
            "caption" => AriaRole::Caption,
            "cell" | "gridcell" => AriaRole::Cell,
            "checkbox" => AriaRole::Checkbox,
            "code" => AriaRole::Code,
            "columnheader" => AriaRole::ColumnHeader,
            "combobox" => AriaRole::Combobox,
            "complementary" => AriaRole::Complementary,
            "contentinfo" => AriaRole::ContentInfo,
            "definition" => AriaRole::Definition,
            "deletion" => AriaRole::Deletion,
            "dialog" | "alertdialog" => AriaRole::Dialog,
            "document" => AriaRole::Document,
            "emphasis" => AriaRole::Emphasis,
            "figure" => AriaRole::Figure,
            "form" => AriaRole::Form,
            "generic" | "presentation" | "none" => AriaRole::Generic,
            "group" => AriaRole::Group,
            "heading" => AriaRole::Heading,
            "img" | "image" => AriaRole::Img,
            "insertion" => AriaRole::Insertion,
            "link" => AriaRole::Link,
            "list" => AriaRole::List,
            "listitem" => AriaRole::ListItem,
            "main" => AriaRole::Main,
            "mark" => AriaRole::Mark,
            "navigation" => AriaRole::Navigation,
            "option" => AriaRole::Option,
            "paragraph" => AriaRole::Paragraph,
            "progressbar" => AriaRole::ProgressBar,
            "radio" => AriaRole::Radio,
            "region" => AriaRole::Region,
            "row" => AriaRole::Row,
            "rowgroup" => AriaRole::RowGroup,
            "rowheader" => AriaRole::RowHeader,
            "search" => AriaRole::Search,
            "searchbox" => AriaRole::SearchBox,
            "separator" => AriaRole::Separator,
            "slider" => AriaRole::Slider,
            "spinbutton" => AriaRole::SpinButton,
            "status" => AriaRole::Status,
            "strong" => AriaRole::Strong,
            "subscript" => AriaRole::Subscript,
            "superscript" => AriaRole::Superscript,
            "switch" => AriaRole::Switch,
            "table" => AriaRole::Table,
            "textbox" => AriaRole::TextBox,
            "time" => AriaRole::Time,
            _ => return None,
        };
        Some(role)
    }
}

/// A node of the accessibility snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AriaNode {
    /// Role as rendered: the explicit `role` attribute token when present,
    /// else the implicit role's canonical name.
    pub role: String,
    /// The closed role classification.
    pub kind: AriaRole,
    /// Accessible name, when one could be computed.
    pub name: Option<String>,
    /// Heading level.
    pub level: Option<u8>,
    pub checked: Option<bool>,
    pub selected: Option<bool>,
    pub expanded: Option<bool>,
    pub disabled: bool,
    pub required: bool,
    /// Current value of inputs/sliders.
    pub value: Option<String>,
    pub children: Vec<AriaNode>,
    /// Originating element, for attribute lookups (`href`, `src`) during
    /// rendering. Synthetic nodes introduced by compression have none.
    pub origin: Option<NodeId>,
}

impl AriaNode {
    pub fn new(kind: AriaRole) -> Self {
        Self {
            role: kind.as_str().to_string(),
            kind,
            name: None,
            level: None,
            checked: None,
            selected: None,
            expanded: None,
            disabled: false,
            required: false,
            value: None,
            children: Vec::new(),
            origin: None,
        }
    }

    pub fn text(content: String) -> Self {
        let mut node = Self::new(AriaRole::Text);
        node.name = Some(content);
        node
    }

    /// Nodes in this subtree, self included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(AriaNode::node_count).sum::<usize>()
    }

    /// Every non-empty name in the subtree, in document order.
    pub fn collect_names(&self, out: &mut Vec<String>) {
        if let Some(name) = &self.name {
            if !name.is_empty() {
                out.push(name.clone());
            }
        }
        for child in &self.children {
            child.collect_names(out);
        }
    }
}

/// A built (or compressed) accessibility snapshot.
#[derive(Debug, Clone)]
pub struct AriaTree {
    pub root: AriaNode,
    pub node_count: usize,
}

impl AriaTree {
    pub fn new(root: AriaNode) -> Self {
        let node_count = root.node_count();
        Self { root, node_count }
    }
}
