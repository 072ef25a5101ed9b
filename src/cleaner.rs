//! Article-only cleanup, run after a candidate container is assembled.
//!
//! Works on the selected subtree only, in the documented order: leftover
//! interactive/embed elements (with a video-host allowlist), near-empty
//! headings, contentless paragraphs, degenerate tables, heading demotion,
//! and finally the conditional density-based cleaning that the
//! `CLEAN_CONDITIONALLY` flag can switch off.

use crate::constants::REGEXPS;
use crate::content::GrabFlags;
use crate::dom::{Cursor, Document, NodeData, NodeId};
use crate::options::ExtractOptions;
use crate::scoring;

/// Tags stripped from article content unless they carry an allowed video
/// embed. Most are already gone after preprocessing; this catches what a
/// caller-supplied tree or sibling assembly dragged back in.
const STRIP_TAGS: &[&str] = &[
    "form", "button", "input", "textarea", "select", "fieldset", "object", "embed", "iframe",
    "applet", "dialog", "aside", "footer",
];

const EMBED_TAGS: &[&str] = &["object", "embed", "iframe", "video"];

pub fn prep_article(
    doc: &mut Document,
    root: NodeId,
    flags: GrabFlags,
    options: &ExtractOptions,
) {
    strip_interactive(doc, root, options);
    clean_headings(doc, root, flags);
    drop_empty_paragraphs(doc, root);
    collapse_degenerate_tables(doc, root);
    demote_h1(doc, root);
    if flags.contains(GrabFlags::CLEAN_CONDITIONALLY) {
        clean_conditionally(doc, root, flags, options);
    }
}

fn strip_interactive(doc: &mut Document, root: NodeId, options: &ExtractOptions) {
    let mut cursor = Cursor::new(root);
    let mut current = cursor.advance(doc);
    while let Some(id) = current {
        let strip = doc
            .tag(id)
            .is_some_and(|tag| STRIP_TAGS.contains(&tag))
            && !is_allowed_video(doc, id, options);
        current = if strip {
            cursor.remove_advance(doc)
        } else {
            cursor.advance(doc)
        };
    }
}

/// Embeds whose source points at a known video host survive cleanup.
fn is_allowed_video(doc: &Document, id: NodeId, options: &ExtractOptions) -> bool {
    if !doc.tag(id).is_some_and(|tag| EMBED_TAGS.contains(&tag)) {
        return false;
    }
    let pattern = options.allowed_video_regex.as_ref().unwrap_or(&REGEXPS.videos);
    for attr_name in ["src", "data", "href"] {
        if let Some(value) = doc.attr(id, attr_name) {
            if pattern.is_match(value) {
                return true;
            }
        }
    }
    false
}

/// Headings with a negative class/id weight or no text are chrome, not
/// content.
fn clean_headings(doc: &mut Document, root: NodeId, flags: GrabFlags) {
    let weigh = flags.contains(GrabFlags::WEIGHT_CLASSES);
    for tag in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        for heading in doc.elements_by_tag(root, tag) {
            if heading == root || !doc.contains(root, heading) {
                continue;
            }
            let weight = scoring::class_weight(doc, heading, weigh);
            if weight < 0.0 || doc.normalized_text(heading).is_empty() {
                doc.detach(heading);
            }
        }
    }
}

fn drop_empty_paragraphs(doc: &mut Document, root: NodeId) {
    for p in doc.elements_by_tag(root, "p") {
        if p == root || !doc.contains(root, p) {
            continue;
        }
        let has_media = ["img", "embed", "object", "iframe", "picture", "video"]
            .iter()
            .any(|tag| !doc.elements_by_tag(p, tag).is_empty());
        if !has_media && doc.normalized_text(p).is_empty() {
            doc.detach(p);
        }
    }
}

/// A table holding a single row with a single cell is a layout artifact:
/// the cell content is promoted to a paragraph (all-phrasing content) or a
/// div, replacing the table.
fn collapse_degenerate_tables(doc: &mut Document, root: NodeId) {
    for table in doc.elements_by_tag(root, "table") {
        if table == root || !doc.contains(root, table) {
            continue;
        }
        let rows = doc.elements_by_tag(table, "tr");
        if rows.len() != 1 {
            continue;
        }
        let cells: Vec<NodeId> = doc
            .child_elements(rows[0])
            .into_iter()
            .filter(|&c| doc.has_tag(c, "td") || doc.has_tag(c, "th"))
            .collect();
        if cells.len() != 1 {
            continue;
        }
        let cell = cells[0];
        let all_phrasing = doc
            .children(cell)
            .iter()
            .all(|&child| is_phrasing(doc, child));
        doc.retag(cell, if all_phrasing { "p" } else { "div" });
        doc.replace(table, cell);
    }
}

fn is_phrasing(doc: &Document, id: NodeId) -> bool {
    match doc.data(id) {
        NodeData::Text(_) => true,
        NodeData::Element(el) => crate::constants::PHRASING_TAGS.contains(&el.tag.as_str()),
    }
}

/// Inside article content a page `<h1>` is the article title; structure
/// below the extraction root starts at `<h2>`.
fn demote_h1(doc: &mut Document, root: NodeId) {
    for h1 in doc.elements_by_tag(root, "h1") {
        if doc.contains(root, h1) {
            doc.retag(h1, "h2");
        }
    }
}

/// Density-based cleaning for list/table/div containers: negative weight
/// with any link text, or link-heavy with thin text, removes the node.
fn clean_conditionally(
    doc: &mut Document,
    root: NodeId,
    flags: GrabFlags,
    options: &ExtractOptions,
) {
    let weigh = flags.contains(GrabFlags::WEIGHT_CLASSES);
    for tag in ["table", "ul", "div"] {
        for node in doc.elements_by_tag(root, tag) {
            if node == root || !doc.contains(root, node) {
                continue;
            }
            if has_allowed_video_descendant(doc, node, options) {
                continue;
            }
            let weight = scoring::class_weight(doc, node, weigh);
            let link_density = scoring::link_density(doc, node);
            let text_density = scoring::text_density(doc, node);
            let remove = (weight < 0.0 && link_density > 0.0)
                || (link_density > 0.3 && text_density < 0.9);
            if remove {
                doc.detach(node);
            }
        }
    }
}

fn has_allowed_video_descendant(doc: &Document, id: NodeId, options: &ExtractOptions) -> bool {
    EMBED_TAGS.iter().any(|tag| {
        doc.elements_by_tag(id, tag)
            .into_iter()
            .any(|embed| is_allowed_video(doc, embed, options))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse::parse_html;

    fn clean(html: &str) -> (Document, NodeId) {
        let mut doc = parse_html(html);
        let root = doc.body();
        let options = ExtractOptions::default();
        prep_article(&mut doc, root, GrabFlags::all(), &options);
        (doc, root)
    }

    #[test]
    fn strips_inputs_but_keeps_allowed_video() {
        let (doc, root) = clean(
            "<body>\
             <input type='text'>\
             <iframe src='https://www.youtube.com/embed/abc'></iframe>\
             <iframe src='https://ads.example.com/frame'></iframe>\
             <p>text body here.</p></body>",
        );
        assert!(doc.elements_by_tag(root, "input").is_empty());
        let iframes = doc.elements_by_tag(root, "iframe");
        assert_eq!(iframes.len(), 1);
        assert!(doc
            .attr(iframes[0], "src")
            .unwrap()
            .contains("youtube.com"));
    }

    #[test]
    fn removes_negative_weight_headings() {
        let (doc, root) = clean(
            "<body><h3 class='share-tools'>Share</h3><h3>Real Section</h3><p>x.</p></body>",
        );
        let headings = doc.elements_by_tag(root, "h3");
        assert_eq!(headings.len(), 1);
        assert_eq!(doc.normalized_text(headings[0]), "Real Section");
    }

    #[test]
    fn drops_paragraphs_without_text_or_media() {
        let (doc, root) = clean(
            "<body><p>   </p><p><img src='x.png'></p><p>kept.</p></body>",
        );
        let ps = doc.elements_by_tag(root, "p");
        assert_eq!(ps.len(), 2);
    }

    #[test]
    fn collapses_single_cell_table() {
        let (doc, root) = clean(
            "<body><table><tr><td>just one cell of prose</td></tr></table></body>",
        );
        assert!(doc.elements_by_tag(root, "table").is_empty());
        let ps = doc.elements_by_tag(root, "p");
        assert_eq!(ps.len(), 1);
        assert_eq!(doc.normalized_text(ps[0]), "just one cell of prose");
    }

    #[test]
    fn multi_cell_tables_survive() {
        let (doc, root) = clean(
            "<body><table><tr><td>one</td><td>two</td></tr></table><p>x.</p></body>",
        );
        assert_eq!(doc.elements_by_tag(root, "table").len(), 1);
    }

    #[test]
    fn demotes_h1_to_h2() {
        let (doc, root) = clean("<body><h1>Inner Title</h1><p>x.</p></body>");
        assert!(doc.elements_by_tag(root, "h1").is_empty());
        assert_eq!(doc.elements_by_tag(root, "h2").len(), 1);
    }

    #[test]
    fn conditional_cleaning_removes_negative_link_blocks() {
        let html = "<body>\
             <ul class='related-links'>\
             <li><a href='/1'>first link in the block</a></li>\
             <li><a href='/2'>second link in the block</a></li>\
             <li><a href='/3'>third link in the block</a></li>\
             </ul>\
             <p>Prose paragraph that stays.</p></body>";
        let (doc, root) = clean(html);
        assert!(doc.elements_by_tag(root, "ul").is_empty());
        assert_eq!(doc.elements_by_tag(root, "p").len(), 1);

        // With CLEAN_CONDITIONALLY off the list survives.
        let mut doc = parse_html(html);
        let root = doc.body();
        prep_article(
            &mut doc,
            root,
            GrabFlags::STRIP_UNLIKELYS | GrabFlags::WEIGHT_CLASSES,
            &ExtractOptions::default(),
        );
        assert_eq!(doc.elements_by_tag(root, "ul").len(), 1);
    }

    #[test]
    fn conditional_cleaning_removes_link_heavy_thin_containers() {
        // Many element children, almost no text: per-child text density
        // drops below the removal floor while link density stays high.
        let mut items = String::new();
        for i in 0..40 {
            let label = if i % 2 == 0 { "x" } else { "" };
            items.push_str(&format!("<a href='/{i}'>{label}</a>"));
        }
        let html = format!("<body><div><div class='x'>{items}</div><p>stays.</p></div></body>");
        let (doc, root) = clean(&html);
        assert_eq!(doc.elements_by_tag(root, "a").len(), 0);
        assert_eq!(doc.elements_by_tag(root, "p").len(), 1);
    }
}
