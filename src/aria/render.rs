//! Text outline rendering for accessibility snapshots.

use crate::dom::Document;

use super::{AriaNode, AriaRole, AriaTree};

/// Rendering knobs.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Upper bound on rendered links. When the tree holds more, links are
    /// weighted by depth — shallower is more important — and the least
    /// important are dropped, with a trailing note counting the elisions.
    pub max_links: Option<usize>,
}

/// Render a compressed tree as an indented outline. `doc` is the
/// originating document, consulted for `href`/`src` attributes.
pub fn render_outline(tree: &AriaTree, doc: &Document, options: &RenderOptions) -> String {
    let mut links: Vec<(usize, usize)> = Vec::new(); // (depth, seq)
    collect_links(&tree.root, 0, &mut links);

    let (allowed, elided) = match options.max_links {
        Some(cap) if links.len() > cap => {
            let mut ranked = links.clone();
            ranked.sort_by_key(|&(depth, seq)| (depth, seq));
            let allowed: std::collections::HashSet<usize> =
                ranked.iter().take(cap).map(|&(_, seq)| seq).collect();
            (Some(allowed), links.len() - cap)
        }
        _ => (None, 0),
    };

    let mut out = String::new();
    let mut seq = 0usize;
    render_node(&tree.root, doc, 0, &mut out, &mut seq, allowed.as_ref());
    if elided > 0 {
        out.push_str(&format!("({elided} links elided)\n"));
    }
    out
}

fn collect_links(node: &AriaNode, depth: usize, out: &mut Vec<(usize, usize)>) {
    if node.kind == AriaRole::Link {
        out.push((depth, out.len()));
    }
    for child in &node.children {
        collect_links(child, depth + 1, out);
    }
}

fn render_node(
    node: &AriaNode,
    doc: &Document,
    depth: usize,
    out: &mut String,
    link_seq: &mut usize,
    allowed_links: Option<&std::collections::HashSet<usize>>,
) {
    if node.kind == AriaRole::Link {
        let seq = *link_seq;
        *link_seq += 1;
        if let Some(allowed) = allowed_links {
            if !allowed.contains(&seq) {
                return;
            }
        }
    }

    // Suppress what would render as an empty line of chrome.
    let suppressed = match node.kind {
        AriaRole::Generic => node.name.is_none() && node.children.is_empty(),
        AriaRole::List => node.children.is_empty() && node.name.is_none(),
        _ => false,
    };
    if suppressed {
        return;
    }

    out.push_str(&"  ".repeat(depth));
    out.push_str("- ");
    out.push_str(&node.role);
    if let Some(name) = &node.name {
        out.push_str(&format!(" \"{name}\""));
    }
    for annotation in annotations(node, doc) {
        out.push(' ');
        out.push_str(&annotation);
    }
    out.push('\n');

    for child in &node.children {
        render_node(child, doc, depth + 1, out, link_seq, allowed_links);
    }
}

fn annotations(node: &AriaNode, doc: &Document) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(level) = node.level {
        out.push(format!("[level={level}]"));
    }
    match node.checked {
        Some(true) => out.push("[checked]".to_string()),
        Some(false) => out.push("[unchecked]".to_string()),
        None => {}
    }
    if node.selected == Some(true) {
        out.push("[selected]".to_string());
    }
    match node.expanded {
        Some(true) => out.push("[expanded]".to_string()),
        Some(false) => out.push("[collapsed]".to_string()),
        None => {}
    }
    if node.disabled {
        out.push("[disabled]".to_string());
    }
    if node.required {
        out.push("[required]".to_string());
    }
    if let Some(value) = &node.value {
        out.push(format!("[value={value}]"));
    }
    if let Some(origin) = node.origin {
        match node.kind {
            AriaRole::Link => {
                if let Some(href) = doc.attr(origin, "href") {
                    out.push(format!("({href})"));
                }
            }
            AriaRole::Img => {
                if let Some(src) = doc.attr(origin, "src") {
                    out.push(format!("({src})"));
                }
            }
            _ => {}
        }
    }
    out
}
