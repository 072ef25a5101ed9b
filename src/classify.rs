//! Page-type classification: article or something else.
//!
//! A pure function of the grab outcome and the character threshold. The
//! checks run in a fixed order and consult no hidden state, so identical
//! inputs always classify identically.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::REGEXPS;
use crate::content::Candidate;
use crate::dom::{Document, NodeId};
use crate::scoring;

/// What kind of page the extraction found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// A single dominant article body exists.
    Article,
    /// Index, listing, navigation, or otherwise not a readable article.
    Other,
}

/// Classify the selected content. `root` is the assembled container inside
/// `doc` (None means extraction soft-failed and the page cannot be an
/// article); `candidates` are the ranked scoring survivors.
pub fn classify(
    doc: &Document,
    root: Option<NodeId>,
    candidates: &[Candidate],
    char_threshold: usize,
) -> PageType {
    let Some(root) = root else {
        return PageType::Other;
    };

    let text_length = doc.normalized_text(root).chars().count();
    let root_link_density = scoring::link_density(doc, root);
    let top = candidates.first().map(|c| c.node).unwrap_or(root);

    // (a) Semantic or content-flavored top candidate with half-threshold
    // text and sane link density.
    let semantic = doc.has_tag(top, "main")
        || doc.has_tag(top, "article")
        || doc
            .element(top)
            .map(|el| el.match_string())
            .is_some_and(|m| !m.is_empty() && REGEXPS.positive.is_match(&m));
    if semantic && text_length >= char_threshold / 2 && root_link_density <= 0.5 {
        debug!(text_length, "classified article by semantic container");
        return PageType::Article;
    }

    // (b) Plenty of text, few links.
    if text_length >= char_threshold && root_link_density <= 0.5 {
        return PageType::Article;
    }

    // (c) Two near-equal candidates plus a link-heavy page smells like an
    // index or listing.
    if let [first, second, ..] = candidates {
        let balanced = first.score > 0.0 && second.score >= first.score * 0.8;
        if balanced {
            let body_link_density = scoring::link_density(doc, doc.body());
            let top_link_density = scoring::link_density(doc, first.node);
            if body_link_density > 0.25 || top_link_density > 0.3 {
                debug!(
                    body_link_density,
                    top_link_density, "classified other: balanced candidates"
                );
                return PageType::Other;
            }
        }
    }

    // (d) Many anchors with little body text.
    let body = doc.body();
    let anchor_count = doc.elements_by_tag(body, "a").len();
    let body_text_length = doc.normalized_text(body).chars().count();
    if anchor_count > 30 && body_text_length < char_threshold * 3 / 2 {
        debug!(anchor_count, body_text_length, "classified other: link index");
        return PageType::Other;
    }

    // (e) Fallback floor: the quick per-node content check.
    if scoring::is_probably_content(doc, root) {
        PageType::Article
    } else {
        PageType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Candidate;
    use crate::dom::parse::parse_html;

    fn prose(n: usize) -> String {
        "Sentences of ordinary prose fill this paragraph to a useful length. ".repeat(n)
    }

    #[test]
    fn soft_fail_is_other() {
        let doc = parse_html("<body></body>");
        assert_eq!(classify(&doc, None, &[], 250), PageType::Other);
    }

    #[test]
    fn semantic_container_with_half_threshold_is_article() {
        let html = format!("<body><article>{}</article></body>", prose(3));
        let doc = parse_html(&html);
        let article = doc.elements_by_tag(doc.body(), "article")[0];
        let candidates = [Candidate {
            node: article,
            score: 20.0,
        }];
        // ~200 chars: below the full threshold, above half of it.
        assert_eq!(
            classify(&doc, Some(article), &candidates, 250),
            PageType::Article
        );
    }

    #[test]
    fn balanced_candidates_on_linky_page_is_other() {
        let mut links = String::new();
        for i in 0..12 {
            links.push_str(&format!("<a href='/{i}'>story number {i} teaser text</a> "));
        }
        let html = format!(
            "<body>\
             <div class='content' id='one'>{links}{}</div>\
             <div class='content' id='two'>{links}</div>\
             </body>",
            prose(1)
        );
        let doc = parse_html(&html);
        let divs = doc.elements_by_tag(doc.body(), "div");
        let candidates = [
            Candidate {
                node: divs[0],
                score: 20.0,
            },
            Candidate {
                node: divs[1],
                score: 17.0,
            },
        ];
        assert_eq!(
            classify(&doc, Some(divs[0]), &candidates, 250),
            PageType::Other
        );
    }

    #[test]
    fn many_anchors_little_text_is_other() {
        let mut links = String::new();
        for i in 0..35 {
            links.push_str(&format!("<a href='/{i}'>item</a> "));
        }
        let html = format!("<body><div id='d'>{links}</div></body>");
        let doc = parse_html(&html);
        let div = doc.elements_by_tag(doc.body(), "div")[0];
        assert_eq!(classify(&doc, Some(div), &[], 250), PageType::Other);
    }

    #[test]
    fn classification_is_deterministic() {
        let html = format!("<body><article>{}</article></body>", prose(10));
        let doc = parse_html(&html);
        let article = doc.elements_by_tag(doc.body(), "article")[0];
        let candidates = [Candidate {
            node: article,
            score: 42.0,
        }];
        let first = classify(&doc, Some(article), &candidates, 250);
        for _ in 0..10 {
            assert_eq!(classify(&doc, Some(article), &candidates, 250), first);
        }
        assert_eq!(first, PageType::Article);
    }
}
