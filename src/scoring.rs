//! Content-signal math: base scores, class weights, link and text density,
//! token-set similarity.

use crate::constants::REGEXPS;
use crate::dom::{Document, NodeId};

/// Weight applied to in-page (`#fragment`) anchor text when computing link
/// density.
const HASH_LINK_WEIGHT: f64 = 0.3;

/// Starting score for a candidate, by tag. Containers that usually hold
/// prose start positive; list/form/heading family starts negative.
pub fn initial_score(tag: &str) -> f64 {
    match tag {
        "div" => 5.0,
        "pre" | "td" | "blockquote" => 3.0,
        "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => -5.0,
        _ => 0.0,
    }
}

/// Class/id keyword weight: ±25 per attribute, summed across class and id.
/// Returns 0 when class weighing is disabled for the current attempt.
pub fn class_weight(doc: &Document, id: NodeId, weigh_classes: bool) -> f64 {
    if !weigh_classes {
        return 0.0;
    }
    let Some(el) = doc.element(id) else {
        return 0.0;
    };
    let mut weight = 0.0;
    if let Some(class) = &el.class {
        if !class.is_empty() {
            if REGEXPS.negative.is_match(class) {
                weight -= 25.0;
            }
            if REGEXPS.positive.is_match(class) {
                weight += 25.0;
            }
        }
    }
    if let Some(elem_id) = &el.id {
        if !elem_id.is_empty() {
            if REGEXPS.negative.is_match(elem_id) {
                weight -= 25.0;
            }
            if REGEXPS.positive.is_match(elem_id) {
                weight += 25.0;
            }
        }
    }
    weight
}

/// Fraction of a node's text that is anchor text. In-page `#` anchors are
/// weighted at 0.3, everything else at 1.0.
pub fn link_density(doc: &Document, id: NodeId) -> f64 {
    let text_length = doc.normalized_text(id).chars().count() as f64;
    if text_length == 0.0 {
        return 0.0;
    }
    let mut link_length = 0.0;
    for anchor in doc.elements_by_tag(id, "a") {
        let anchor_text = doc.normalized_text(anchor).chars().count() as f64;
        let href = doc.attr(anchor, "href").unwrap_or_default();
        let weight = if REGEXPS.hash_url.is_match(href) {
            HASH_LINK_WEIGHT
        } else {
            1.0
        };
        link_length += anchor_text * weight;
    }
    link_length / text_length
}

/// Text length divided by the direct element-child count.
pub fn text_density(doc: &Document, id: NodeId) -> f64 {
    let children = doc.child_elements(id).len().max(1);
    doc.normalized_text(id).chars().count() as f64 / children as f64
}

/// Comma count across scripts, for the base content score.
pub fn comma_count(text: &str) -> usize {
    REGEXPS.commas.find_iter(text).count()
}

/// Token-set similarity in [0, 1]: the Jaccard index over lowercase word
/// sets. Used for near-duplicate title detection and JSON-LD title
/// arbitration at the 0.75 threshold.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: std::collections::HashSet<String> = a
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let tokens_b: std::collections::HashSet<String> = b
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count() as f64;
    let union = tokens_a.union(&tokens_b).count() as f64;
    intersection / union
}

/// Quick per-node accept/reject: visible, enough prose, not link-dominated.
/// A node that is mostly anchor text fails regardless of length.
pub fn is_probably_content(doc: &Document, id: NodeId) -> bool {
    if !doc.is_visible(id) {
        return false;
    }
    let length = doc.normalized_text(id).chars().count();
    length >= 140 && link_density(doc, id) <= 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_body(children: &[(&str, &str)]) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let ids = children
            .iter()
            .map(|(tag, text)| {
                let el = doc.create_element(tag);
                let t = doc.create_text(text);
                doc.append(el, t);
                doc.append(body, el);
                el
            })
            .collect();
        (doc, ids)
    }

    #[test]
    fn initial_scores_follow_tag_table() {
        assert_eq!(initial_score("div"), 5.0);
        assert_eq!(initial_score("blockquote"), 3.0);
        assert_eq!(initial_score("ul"), -3.0);
        assert_eq!(initial_score("h2"), -5.0);
        assert_eq!(initial_score("p"), 0.0);
    }

    #[test]
    fn class_weight_sums_class_and_id() {
        let mut doc = Document::new();
        let body = doc.body();
        let el = doc.create_element("div");
        doc.set_attribute(el, "class", "article");
        doc.set_attribute(el, "id", "main-content");
        doc.append(body, el);
        assert_eq!(class_weight(&doc, el, true), 50.0);
        assert_eq!(class_weight(&doc, el, false), 0.0);

        let bad = doc.create_element("div");
        doc.set_attribute(bad, "class", "sidebar");
        doc.append(body, bad);
        assert_eq!(class_weight(&doc, bad, true), -25.0);
    }

    #[test]
    fn link_density_weights_hash_anchors() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.create_element("div");
        doc.append(body, div);
        let text = doc.create_text("aaaaaaaaaa"); // 10 chars plain
        doc.append(div, text);
        let a = doc.create_element("a");
        doc.set_attribute(a, "href", "#top");
        let a_text = doc.create_text("bbbbbbbbbb"); // 10 chars anchored
        doc.append(a, a_text);
        doc.append(div, a);
        // 10 * 0.3 / 20 = 0.15
        assert!((link_density(&doc, div) - 0.15).abs() < 1e-9);

        doc.set_attribute(a, "href", "/page");
        assert!((link_density(&doc, div) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn similarity_is_symmetric_and_bounded() {
        assert_eq!(text_similarity("Big News Today", "big news today"), 1.0);
        let sim = text_similarity("Big News Today", "Big News Today | Example Site");
        assert!(sim > 0.5 && sim < 1.0);
        assert_eq!(text_similarity("alpha", "omega"), 0.0);
    }

    #[test]
    fn link_dominated_nodes_are_not_content() {
        let long_prose = "word ".repeat(60);
        let (doc, ids) = doc_with_body(&[("p", long_prose.as_str())]);
        assert!(is_probably_content(&doc, ids[0]));

        // Same length, but all anchor text.
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.create_element("p");
        let a = doc.create_element("a");
        doc.set_attribute(a, "href", "/x");
        let t = doc.create_text(&long_prose);
        doc.append(a, t);
        doc.append(p, a);
        doc.append(body, p);
        assert!(!is_probably_content(&doc, p));
    }

    #[test]
    fn comma_count_spans_scripts() {
        assert_eq!(comma_count("a,b，c"), 2);
    }
}
