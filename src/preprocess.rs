//! Noise removal ahead of analysis.
//!
//! Two in-place sweeps over the tree: first a fixed denylist of
//! structural/non-content tags, then elements that look like ad slots.
//! Absence of matches is a no-op; running the preprocessor on an already
//! preprocessed tree changes nothing.

use crate::constants::{NOISE_TAGS, REGEXPS};
use crate::dom::{Cursor, Document, NodeId};

/// Strip scripts, styles, chrome, and ad-likely elements. Mutates the tree
/// in place; never fails.
pub fn strip_noise(doc: &mut Document) {
    remove_noise_tags(doc);
    remove_ad_elements(doc);
}

fn remove_noise_tags(doc: &mut Document) {
    let root = doc.root();
    let mut cursor = Cursor::new(root);
    let mut current = cursor.advance(doc);
    while let Some(id) = current {
        let is_noise = doc
            .tag(id)
            .is_some_and(|tag| NOISE_TAGS.contains(&tag));
        current = if is_noise {
            cursor.remove_advance(doc)
        } else {
            cursor.advance(doc)
        };
    }
}

fn remove_ad_elements(doc: &mut Document) {
    let root = doc.root();
    let body = doc.body();
    let mut cursor = Cursor::new(root);
    let mut current = cursor.advance(doc);
    while let Some(id) = current {
        current = if id != body && is_ad_element(doc, id) {
            cursor.remove_advance(doc)
        } else {
            cursor.advance(doc)
        };
    }
}

/// Ad heuristic: id/class/role matching the ad marker set, an explicit
/// `role="advertisement"`, or any `data-ad*` attribute.
fn is_ad_element(doc: &Document, id: NodeId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    let match_string = el.match_string();
    if !match_string.is_empty() && REGEXPS.ad_markers.is_match(&match_string) {
        return true;
    }
    if let Some(role) = el.attr("role") {
        if role.eq_ignore_ascii_case("advertisement") || REGEXPS.ad_markers.is_match(role) {
            return true;
        }
    }
    el.attrs
        .iter()
        .any(|attr| attr.name.starts_with("data-ad"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse::parse_html;

    #[test]
    fn removes_denylisted_tags() {
        let mut doc = parse_html(
            "<html><body>\
             <nav><a href='/a'>a</a><a href='/b'>b</a></nav>\
             <script>var x = 1;</script>\
             <p>Article text.</p>\
             <footer>site footer</footer>\
             </body></html>",
        );
        strip_noise(&mut doc);
        assert!(doc.elements_by_tag(doc.body(), "nav").is_empty());
        assert!(doc.elements_by_tag(doc.body(), "script").is_empty());
        assert!(doc.elements_by_tag(doc.body(), "footer").is_empty());
        assert_eq!(doc.normalized_text(doc.body()), "Article text.");
    }

    #[test]
    fn removes_ad_slots() {
        let mut doc = parse_html(
            "<body>\
             <div class='ad-container'>buy things</div>\
             <div data-ad-slot='123'>slot</div>\
             <div role='advertisement'>promo</div>\
             <div class='content'><p>kept</p></div>\
             </body>",
        );
        strip_noise(&mut doc);
        assert_eq!(doc.normalized_text(doc.body()), "kept");
    }

    #[test]
    fn is_idempotent() {
        let mut doc = parse_html(
            "<body><aside>chrome</aside><div class='sponsor'>x</div><p>text</p></body>",
        );
        strip_noise(&mut doc);
        let after_first = doc.normalized_text(doc.body());
        let count_first = doc.element_count();
        strip_noise(&mut doc);
        assert_eq!(doc.normalized_text(doc.body()), after_first);
        assert_eq!(doc.element_count(), count_first);
    }

    #[test]
    fn no_matches_is_a_noop() {
        let mut doc = parse_html("<body><article><p>plain</p></article></body>");
        let before = doc.element_count();
        strip_noise(&mut doc);
        assert_eq!(doc.element_count(), before);
    }
}
