//! Lossy accessibility-tree compression.
//!
//! A bottom-up fold producing a new tree. Every rewrite either strictly
//! reduces the node count or is applied once and re-examined, so the fold
//! terminates by construction. Names are never lost: when a named node is
//! dissolved its name merges into the absorbing node's name.

use super::{AriaNode, AriaRole, AriaTree};

/// Sibling kinds that collapse into one synthetic node when repeated.
const GROUPABLE: &[AriaRole] = &[
    AriaRole::Article,
    AriaRole::Region,
    AriaRole::ListItem,
    AriaRole::Img,
];

/// Compress a built tree into a compact one of the same node type.
pub fn compress(tree: AriaTree) -> AriaTree {
    AriaTree::new(compress_node(tree.root))
}

fn compress_node(mut node: AriaNode) -> AriaNode {
    node.children = node.children.into_iter().map(compress_node).collect();

    reduce_to_fixed_point(&mut node);
    if group_repeated_siblings(&mut node) {
        // Grouping adds a synthetic parent; one more reduction pass folds
        // the grouped members into it.
        reduce_to_fixed_point(&mut node);
    }
    node
}

/// Apply the strictly-decreasing rewrites until nothing changes.
fn reduce_to_fixed_point(node: &mut AriaNode) {
    loop {
        let mut changed = false;
        changed |= dissolve_children(node);
        changed |= merge_text_runs(node);
        changed |= collapse_text_wrappers(node);
        changed |= flatten_type_chains(node);
        if !changed {
            break;
        }
    }
}

/// A child dissolves into its parent when it is generic with no name, or
/// when it shares the parent's type. Its children splice into the parent's
/// child list at its position; its name merges into the parent's.
fn dissolve_children(node: &mut AriaNode) -> bool {
    let mut changed = false;
    let mut index = 0;
    while index < node.children.len() {
        let child = &node.children[index];
        let generic_noise = child.kind == AriaRole::Generic && child.name.is_none();
        let same_type = child.kind == node.kind && child.kind != AriaRole::Text;
        if generic_noise || same_type {
            let child = node.children.remove(index);
            if let Some(name) = child.name {
                node.name = Some(merge_names(node.name.take(), name));
            }
            for (offset, grandchild) in child.children.into_iter().enumerate() {
                node.children.insert(index + offset, grandchild);
            }
            changed = true;
            // Re-examine the spliced position.
            continue;
        }
        index += 1;
    }
    changed
}

/// Adjacent text siblings concatenate names and re-parent their children.
fn merge_text_runs(node: &mut AriaNode) -> bool {
    let mut changed = false;
    let mut index = 0;
    while index + 1 < node.children.len() {
        if node.children[index].kind == AriaRole::Text
            && node.children[index + 1].kind == AriaRole::Text
        {
            let right = node.children.remove(index + 1);
            let left = &mut node.children[index];
            left.name = match (left.name.take(), right.name) {
                (Some(a), Some(b)) => Some(merge_names(Some(a), b)),
                (a, b) => a.or(b),
            };
            left.children.extend(right.children);
            changed = true;
            continue;
        }
        index += 1;
    }
    changed
}

/// A text node whose only child is a single named or typed node collapses
/// into that child.
fn collapse_text_wrappers(node: &mut AriaNode) -> bool {
    let mut changed = false;
    for child in node.children.iter_mut() {
        if child.kind != AriaRole::Text || child.children.len() != 1 {
            continue;
        }
        let only = &child.children[0];
        if only.name.is_none() && only.kind == AriaRole::Generic {
            continue;
        }
        let Some(mut promoted) = child.children.pop() else {
            continue;
        };
        if let Some(wrapper_name) = child.name.take() {
            promoted.name = Some(merge_names(
                Some(wrapper_name),
                promoted.name.take().unwrap_or_default(),
            ));
        }
        *child = promoted;
        changed = true;
    }
    changed
}

/// A child whose single grandchild shares its type flattens one level.
fn flatten_type_chains(node: &mut AriaNode) -> bool {
    let mut changed = false;
    for child in node.children.iter_mut() {
        if child.children.len() != 1 {
            continue;
        }
        if child.children[0].kind != child.kind {
            continue;
        }
        let Some(grandchild) = child.children.pop() else {
            continue;
        };
        if let Some(name) = grandchild.name {
            child.name = Some(merge_names(child.name.take(), name));
        }
        child.children = grandchild.children;
        changed = true;
    }
    changed
}

/// Runs of ≥2 adjacent siblings of a groupable kind collapse under one
/// synthetic node of that kind (which the next reduction pass folds the
/// members into). Skipped when the parent already has that kind.
fn group_repeated_siblings(node: &mut AriaNode) -> bool {
    let mut changed = false;
    let mut index = 0;
    while index < node.children.len() {
        let kind = node.children[index].kind;
        if !GROUPABLE.contains(&kind) || kind == node.kind {
            index += 1;
            continue;
        }
        let mut run_end = index + 1;
        while run_end < node.children.len() && node.children[run_end].kind == kind {
            run_end += 1;
        }
        if run_end - index >= 2 {
            let members: Vec<AriaNode> = node.children.drain(index..run_end).collect();
            let mut group = AriaNode::new(kind);
            group.children = members;
            // The members share the synthetic parent's type, so reduction
            // folds them into it.
            reduce_to_fixed_point(&mut group);
            node.children.insert(index, group);
            changed = true;
        }
        index += 1;
    }
    changed
}

fn merge_names(existing: Option<String>, incoming: String) -> String {
    match existing {
        Some(existing) if !existing.is_empty() => {
            if incoming.is_empty() {
                existing
            } else {
                format!("{existing} {incoming}")
            }
        }
        _ => incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(kind: AriaRole, name: &str) -> AriaNode {
        let mut node = AriaNode::new(kind);
        node.name = Some(name.to_string());
        node
    }

    fn with_children(kind: AriaRole, children: Vec<AriaNode>) -> AriaNode {
        let mut node = AriaNode::new(kind);
        node.children = children;
        node
    }

    fn names(tree: &AriaTree) -> Vec<String> {
        let mut out = Vec::new();
        tree.root.collect_names(&mut out);
        out
    }

    #[test]
    fn merges_adjacent_text_siblings() {
        let root = with_children(
            AriaRole::Paragraph,
            vec![
                AriaNode::text("first".into()),
                AriaNode::text("second".into()),
                AriaNode::text("third".into()),
            ],
        );
        let tree = compress(AriaTree::new(root));
        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(
            tree.root.children[0].name.as_deref(),
            Some("first second third")
        );
    }

    #[test]
    fn dissolves_unnamed_generic_wrappers() {
        let inner = named(AriaRole::Link, "go");
        let wrapper = with_children(AriaRole::Generic, vec![inner]);
        let root = with_children(AriaRole::Main, vec![wrapper]);
        let before = AriaTree::new(root);
        let before_count = before.node_count;
        let tree = compress(before);
        assert!(tree.node_count < before_count);
        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(tree.root.children[0].kind, AriaRole::Link);
    }

    #[test]
    fn collapses_text_wrapper_around_typed_node() {
        let link = named(AriaRole::Link, "target");
        let wrapper = with_children(AriaRole::Text, vec![link]);
        let root = with_children(AriaRole::Paragraph, vec![wrapper]);
        let tree = compress(AriaTree::new(root));
        assert_eq!(tree.root.children.len(), 1);
        assert_eq!(tree.root.children[0].kind, AriaRole::Link);
        assert_eq!(tree.root.children[0].name.as_deref(), Some("target"));
    }

    #[test]
    fn groups_repeated_siblings_without_growing() {
        let root = with_children(
            AriaRole::List,
            vec![
                named(AriaRole::ListItem, "one"),
                named(AriaRole::ListItem, "two"),
                named(AriaRole::ListItem, "three"),
            ],
        );
        let before = AriaTree::new(root);
        let before_count = before.node_count;
        let tree = compress(before);
        assert!(tree.node_count <= before_count);
        // All three names survive, merged.
        let all = names(&tree).join(" ");
        for name in ["one", "two", "three"] {
            assert!(all.contains(name));
        }
    }

    #[test]
    fn flattens_single_grandchild_chains() {
        let grandchild = named(AriaRole::Navigation, "menu");
        let child = with_children(AriaRole::Navigation, vec![grandchild]);
        let root = with_children(AriaRole::Document, vec![child]);
        let tree = compress(AriaTree::new(root));
        assert_eq!(tree.root.children.len(), 1);
        let nav = &tree.root.children[0];
        assert_eq!(nav.kind, AriaRole::Navigation);
        assert_eq!(nav.name.as_deref(), Some("menu"));
        assert!(nav.children.is_empty());
    }

    #[test]
    fn compression_never_orphans_names() {
        let root = with_children(
            AriaRole::Document,
            vec![
                with_children(
                    AriaRole::Generic,
                    vec![
                        named(AriaRole::Link, "alpha"),
                        AriaNode::text("beta".into()),
                        AriaNode::text("gamma".into()),
                    ],
                ),
                named(AriaRole::Heading, "delta"),
            ],
        );
        let before = AriaTree::new(root);
        let mut before_names = Vec::new();
        before.root.collect_names(&mut before_names);
        let tree = compress(before);
        let after = names(&tree).join(" ");
        for name in before_names {
            assert!(after.contains(&name), "name {name:?} lost in compression");
        }
    }

    #[test]
    fn node_count_reduces_or_stays() {
        let root = with_children(
            AriaRole::Document,
            vec![
                with_children(AriaRole::Generic, vec![AriaNode::text("x".into())]),
                with_children(
                    AriaRole::List,
                    vec![
                        named(AriaRole::ListItem, "a"),
                        named(AriaRole::ListItem, "b"),
                    ],
                ),
            ],
        );
        let before = AriaTree::new(root);
        let before_count = before.node_count;
        let tree = compress(before);
        assert!(tree.node_count <= before_count);
    }
}
