//! Metadata extraction from meta tags, JSON-LD, and document structure.
//!
//! Runs against the raw tree, before the preprocessor strips `<script>`
//! tags. Fields degrade independently: each falls through its precedence
//! chain and absence is a `None`, never an error. The global order per
//! field is meta tags → JSON-LD → document-derived heuristics; the title
//! additionally goes through the refinement rules in [`refine_title`] and
//! JSON-LD arbitration by token-set similarity.

use std::collections::HashMap;

use serde_json::Value;

use crate::constants::REGEXPS;
use crate::dom::{Document, NodeId};
use crate::scoring::text_similarity;
use crate::utils;

/// Similarity threshold at which two titles count as the same title.
pub const TITLE_SIMILARITY: f64 = 0.75;

/// Extracted document metadata. Immutable once returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
    pub published_time: Option<String>,
    pub lang: Option<String>,
    pub dir: Option<String>,
}

/// Collect metadata with the documented precedence. `json_ld` comes from
/// [`get_json_ld`]; pass `Metadata::default()` when JSON-LD is disabled.
pub fn get_metadata(doc: &Document, json_ld: Metadata) -> Metadata {
    let values = collect_meta_values(doc);
    let mut metadata = Metadata::default();

    let raw_title = pick(
        &values,
        &[
            "dc:title",
            "dcterm:title",
            "og:title",
            "weibo:article:title",
            "weibo:webpage:title",
            "title",
            "twitter:title",
        ],
    )
    .or(json_ld.title)
    .or_else(|| document_title(doc));

    metadata.title = raw_title
        .map(|t| refine_title(&utils::unescape_html_entities(&t), doc))
        .filter(|t| !t.is_empty());

    metadata.byline = pick(
        &values,
        &[
            "author",
            "article:author",
            "og:author",
            "dc:creator",
            "dcterm:creator",
        ],
    )
    .filter(|v| !utils::is_url(v))
    .or_else(|| rel_author_byline(doc))
    .or(json_ld.byline)
    .map(|b| utils::unescape_html_entities(&b))
    .filter(|b| !b.trim().is_empty() && b.chars().count() < 100);

    metadata.excerpt = pick(
        &values,
        &[
            "description",
            "dc:description",
            "dcterm:description",
            "og:description",
            "twitter:description",
        ],
    )
    .or(json_ld.excerpt)
    .map(|e| utils::unescape_html_entities(&e))
    .filter(|e| !e.trim().is_empty());

    metadata.site_name = pick(&values, &["og:site_name"])
        .or(json_ld.site_name)
        .map(|s| utils::unescape_html_entities(&s));

    metadata.published_time =
        pick(&values, &["article:published_time", "parsely-pub-date"]).or(json_ld.published_time);

    let root = doc.root();
    metadata.lang = doc
        .attr(root, "lang")
        .map(str::to_string)
        .or_else(|| doc.attr(doc.body(), "lang").map(str::to_string));
    metadata.dir = doc.attr(root, "dir").map(str::to_string);

    metadata
}

/// Map of normalized meta key → content for every `<meta>` in the tree.
/// Keys lowercase, whitespace stripped, `.` normalized to `:`; the first
/// occurrence of a key wins.
fn collect_meta_values(doc: &Document) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for meta in doc.elements_by_tag(doc.root(), "meta") {
        let Some(content) = doc.attr(meta, "content") else {
            continue;
        };
        let content = content.trim();
        if content.is_empty() {
            continue;
        }
        for key_attr in ["name", "property"] {
            if let Some(raw_key) = doc.attr(meta, key_attr) {
                // Space-separated property lists each map to the content.
                for key in raw_key.split_whitespace() {
                    let normalized = normalize_meta_key(key);
                    if !normalized.is_empty() {
                        values
                            .entry(normalized)
                            .or_insert_with(|| content.to_string());
                    }
                }
            }
        }
    }
    values
}

fn normalize_meta_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| if ch == '.' { ':' } else { ch.to_ascii_lowercase() })
        .collect()
}

fn pick(values: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| values.get(*key).cloned())
}

fn document_title(doc: &Document) -> Option<String> {
    let titles = doc.elements_by_tag(doc.root(), "title");
    titles
        .first()
        .map(|&t| doc.normalized_text(t))
        .filter(|t| !t.is_empty())
}

fn rel_author_byline(doc: &Document) -> Option<String> {
    for anchor in doc.elements_by_tag(doc.root(), "a") {
        let has_author_rel = doc.attr(anchor, "rel").is_some_and(|rel| {
            rel.split_whitespace()
                .any(|r| r.eq_ignore_ascii_case("author"))
        });
        if !has_author_rel {
            continue;
        }
        let text = doc.normalized_text(anchor);
        if !text.is_empty() && text.chars().count() < 100 {
            return Some(text);
        }
    }
    None
}

/// Title refinement: separator stripping, colon handling, lone-`<h1>`
/// preference, and a final revert guard against over-trimming.
pub fn refine_title(raw: &str, doc: &Document) -> String {
    let original = utils::normalize_whitespace(raw);
    let mut title = original.clone();
    let separator_found = REGEXPS.title_separator.is_match(&title);

    if separator_found {
        if let Some(m) = REGEXPS.title_separator.find_iter(&title).last() {
            let left = title[..m.start()].trim().to_string();
            let right = title[m.end()..].trim().to_string();
            // Strip the shortest side; if the survivor is too short, the
            // original stands.
            let survivor = if utils::word_count(&left) >= utils::word_count(&right) {
                left
            } else {
                right
            };
            if utils::word_count(&survivor) >= 3 {
                title = survivor;
            }
        }
    }

    if title.contains(": ") {
        let after_last = title
            .rsplit_once(':')
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_default();
        let (before_first, after_first) = title
            .split_once(':')
            .map(|(a, b)| (a.trim().to_string(), b.trim().to_string()))
            .unwrap_or_default();
        if utils::word_count(&after_last) >= 3 {
            title = after_last;
        } else if utils::word_count(&before_first) <= 5 {
            title = after_first;
        }
    }

    let char_len = title.chars().count();
    if !(15..=150).contains(&char_len) {
        let h1s = doc.elements_by_tag(doc.root(), "h1");
        if h1s.len() == 1 {
            let h1_text = doc.normalized_text(h1s[0]);
            if !h1_text.is_empty() {
                title = h1_text;
            }
        }
    }

    let title = utils::normalize_whitespace(&title);
    let derived_words = utils::word_count(&title);
    if derived_words <= 4 {
        // Word count of the original with separator glyphs removed — the
        // baseline a legitimate trim is measured against.
        let baseline = utils::word_count(
            &original
                .split_whitespace()
                .filter(|w| !matches!(*w, "|" | "-" | "\\" | "/" | ">" | "»"))
                .collect::<Vec<_>>()
                .join(" "),
        );
        let dropped = baseline as i64 - derived_words as i64;
        if !separator_found || dropped > 1 {
            return original;
        }
    }
    title
}

/// Parse `<script type="application/ld+json">` blocks. Only objects whose
/// `@context` resolves to schema.org and whose `@type` is a Schema.org
/// Article subtype are trusted; malformed blocks are skipped per tag.
pub fn get_json_ld(doc: &Document) -> Metadata {
    let mut metadata = Metadata::default();
    let html_title = document_title(doc).unwrap_or_default();

    for script in doc.elements_by_tag(doc.root(), "script") {
        let is_json_ld = doc
            .attr(script, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("application/ld+json"));
        if !is_json_ld {
            continue;
        }
        let content = doc.text_content(script);
        let content = content
            .trim()
            .trim_start_matches("<![CDATA[")
            .trim_end_matches("]]>")
            .trim();
        let Ok(parsed) = serde_json::from_str::<Value>(content) else {
            continue;
        };
        let Some(article) = find_article_object(&parsed) else {
            continue;
        };
        apply_json_ld(&mut metadata, article, &html_title);
    }

    metadata
}

/// Locate the trusted Article object: the value itself, the first Article
/// in a top-level array, or the first Article inside `@graph`.
fn find_article_object(parsed: &Value) -> Option<&Value> {
    if let Some(arr) = parsed.as_array() {
        return arr.iter().find(|item| is_trusted_article(item));
    }
    if is_trusted_article(parsed) {
        return Some(parsed);
    }
    if has_schema_context(parsed) {
        if let Some(graph) = parsed.get("@graph").and_then(Value::as_array) {
            return graph.iter().find(|item| is_article_type(item));
        }
    }
    None
}

fn is_trusted_article(value: &Value) -> bool {
    has_schema_context(value) && is_article_type(value)
}

fn is_article_type(value: &Value) -> bool {
    value
        .get("@type")
        .and_then(Value::as_str)
        .is_some_and(|t| REGEXPS.json_ld_article_types.is_match(t))
}

fn has_schema_context(value: &Value) -> bool {
    match value.get("@context") {
        Some(Value::String(ctx)) => REGEXPS.schema_org.is_match(ctx),
        Some(Value::Object(ctx)) => ctx
            .get("@vocab")
            .and_then(Value::as_str)
            .is_some_and(|v| REGEXPS.schema_org.is_match(v)),
        _ => false,
    }
}

fn apply_json_ld(metadata: &mut Metadata, article: &Value, html_title: &str) {
    if metadata.title.is_none() {
        metadata.title = json_ld_title(article, html_title);
    }

    if metadata.byline.is_none() {
        if let Some(author) = article.get("author") {
            metadata.byline = json_ld_author(author);
        }
    }

    if metadata.excerpt.is_none() {
        metadata.excerpt = article
            .get("description")
            .and_then(Value::as_str)
            .map(|d| d.trim().to_string());
    }

    if metadata.site_name.is_none() {
        metadata.site_name = article
            .get("publisher")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .map(|n| n.trim().to_string());
    }

    if metadata.published_time.is_none() {
        metadata.published_time = article
            .get("datePublished")
            .and_then(Value::as_str)
            .map(|d| d.trim().to_string());
    }
}

/// `name` vs `headline` arbitration: when both exist and disagree, prefer
/// whichever is ≥0.75 similar to the HTML title; otherwise `name`, unless
/// `name` is really the publisher name.
fn json_ld_title(article: &Value, html_title: &str) -> Option<String> {
    let name = article.get("name").and_then(Value::as_str).map(str::trim);
    let headline = article
        .get("headline")
        .and_then(Value::as_str)
        .map(str::trim);
    let publisher_name = article
        .get("publisher")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(str::trim);

    match (name, headline) {
        (Some(name), Some(headline)) if name != headline => {
            let name_sim = text_similarity(name, html_title);
            let headline_sim = text_similarity(headline, html_title);
            if headline_sim >= TITLE_SIMILARITY && headline_sim > name_sim {
                Some(headline.to_string())
            } else if name_sim >= TITLE_SIMILARITY {
                Some(name.to_string())
            } else if publisher_name == Some(name) {
                Some(headline.to_string())
            } else {
                Some(name.to_string())
            }
        }
        (Some(name), _) => Some(name.to_string()),
        (None, Some(headline)) => Some(headline.to_string()),
        (None, None) => None,
    }
}

fn json_ld_author(author: &Value) -> Option<String> {
    if let Some(name) = author.get("name").and_then(Value::as_str) {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    if let Some(authors) = author.as_array() {
        let names: Vec<String> = authors
            .iter()
            .filter_map(|a| a.get("name").and_then(Value::as_str))
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if !names.is_empty() {
            return Some(names.join(", "));
        }
    }
    None
}

/// First substantial paragraph of the selected content, used as the
/// excerpt when no metadata description exists.
pub fn excerpt_from_content(doc: &Document, root: NodeId) -> Option<String> {
    for p in doc.elements_by_tag(root, "p") {
        let text = doc.normalized_text(p);
        if text.chars().count() < 25 {
            continue;
        }
        if crate::scoring::link_density(doc, p) > 0.5 {
            continue;
        }
        let match_string = doc.element(p).map(|el| el.match_string()).unwrap_or_default();
        if REGEXPS.byline.is_match(&match_string) {
            continue;
        }
        return Some(text);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse::parse_html;

    #[test]
    fn meta_title_beats_document_title() {
        let doc = parse_html(
            "<html><head>\
             <title>Document Title With Plenty Of Words</title>\
             <meta property='og:title' content='The Open Graph Article Title'>\
             </head><body></body></html>",
        );
        let metadata = get_metadata(&doc, Metadata::default());
        assert_eq!(
            metadata.title.as_deref(),
            Some("The Open Graph Article Title")
        );
    }

    #[test]
    fn separator_strips_short_site_suffix() {
        let doc = parse_html(
            "<html><head><title>The Quick Brown Fox Jumps High | Tiny</title></head>\
             <body></body></html>",
        );
        let metadata = get_metadata(&doc, Metadata::default());
        assert_eq!(
            metadata.title.as_deref(),
            Some("The Quick Brown Fox Jumps High")
        );
    }

    #[test]
    fn short_title_with_lone_h1_prefers_h1() {
        let doc = parse_html(
            "<html><head><meta property='og:title' content='A | Site'></head>\
             <body><h1>A</h1><p>body</p></body></html>",
        );
        let metadata = get_metadata(&doc, Metadata::default());
        assert_eq!(metadata.title.as_deref(), Some("A"));
    }

    #[test]
    fn colon_title_prefers_tail() {
        let doc = parse_html(
            "<html><head><title>Series: The Long Awaited Finale Episode</title></head>\
             <body></body></html>",
        );
        let metadata = get_metadata(&doc, Metadata::default());
        assert_eq!(
            metadata.title.as_deref(),
            Some("The Long Awaited Finale Episode")
        );
    }

    #[test]
    fn long_prefix_keeps_original_colon_title() {
        let doc = parse_html(
            "<html><head><title>One two three four five six: tail</title></head>\
             <body></body></html>",
        );
        let metadata = get_metadata(&doc, Metadata::default());
        assert_eq!(
            metadata.title.as_deref(),
            Some("One two three four five six: tail")
        );
    }

    #[test]
    fn byline_from_meta_then_rel_author() {
        let doc = parse_html(
            "<html><head><meta name='author' content='Ada Lovelace'></head>\
             <body><a rel='author' href='/ada'>Someone Else</a></body></html>",
        );
        let metadata = get_metadata(&doc, Metadata::default());
        assert_eq!(metadata.byline.as_deref(), Some("Ada Lovelace"));

        let doc = parse_html(
            "<html><head></head>\
             <body><a rel='author' href='/ada'>Ada Lovelace</a></body></html>",
        );
        let metadata = get_metadata(&doc, Metadata::default());
        assert_eq!(metadata.byline.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn url_bylines_are_rejected() {
        let doc = parse_html(
            "<html><head><meta property='article:author' content='https://example.com/u/1'></head>\
             <body></body></html>",
        );
        let metadata = get_metadata(&doc, Metadata::default());
        assert_eq!(metadata.byline, None);
    }

    #[test]
    fn json_ld_requires_schema_context_and_article_type() {
        let doc = parse_html(
            r#"<html><head><script type="application/ld+json">
            {"@context":"https://schema.org","@type":"WebSite","name":"Not An Article"}
            </script></head><body></body></html>"#,
        );
        assert_eq!(get_json_ld(&doc), Metadata::default());

        let doc = parse_html(
            r#"<html><head><script type="application/ld+json">
            {"@context":"https://schema.org","@type":"NewsArticle",
             "headline":"Proper Headline Here",
             "author":{"name":"Grace Hopper"},
             "datePublished":"2024-05-01",
             "publisher":{"name":"The Daily Example"}}
            </script></head><body></body></html>"#,
        );
        let json_ld = get_json_ld(&doc);
        assert_eq!(json_ld.title.as_deref(), Some("Proper Headline Here"));
        assert_eq!(json_ld.byline.as_deref(), Some("Grace Hopper"));
        assert_eq!(json_ld.site_name.as_deref(), Some("The Daily Example"));
        assert_eq!(json_ld.published_time.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn malformed_json_ld_is_skipped() {
        let doc = parse_html(
            r#"<html><head>
            <script type="application/ld+json">{not json at all</script>
            <script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Article","headline":"Recovered Title Text"}
            </script></head><body></body></html>"#,
        );
        let json_ld = get_json_ld(&doc);
        assert_eq!(json_ld.title.as_deref(), Some("Recovered Title Text"));
    }

    #[test]
    fn json_ld_graph_is_searched() {
        let doc = parse_html(
            r#"<html><head><script type="application/ld+json">
            {"@context":"https://schema.org","@graph":[
              {"@type":"BreadcrumbList"},
              {"@type":"BlogPosting","headline":"Graph Article Headline"}
            ]}</script></head><body></body></html>"#,
        );
        let json_ld = get_json_ld(&doc);
        assert_eq!(json_ld.title.as_deref(), Some("Graph Article Headline"));
    }

    #[test]
    fn headline_similar_to_html_title_wins_over_name() {
        let doc = parse_html(
            r#"<html><head><title>Rust In Production At Scale</title>
            <script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Article",
             "name":"The Daily Example",
             "headline":"Rust In Production At Scale"}
            </script></head><body></body></html>"#,
        );
        let json_ld = get_json_ld(&doc);
        assert_eq!(json_ld.title.as_deref(), Some("Rust In Production At Scale"));
    }

    #[test]
    fn author_array_is_joined() {
        let doc = parse_html(
            r#"<html><head><script type="application/ld+json">
            {"@context":"https://schema.org","@type":"Article","headline":"Multi Author Piece Here",
             "author":[{"name":"A. One"},{"name":"B. Two"}]}
            </script></head><body></body></html>"#,
        );
        let json_ld = get_json_ld(&doc);
        assert_eq!(json_ld.byline.as_deref(), Some("A. One, B. Two"));
    }

    #[test]
    fn lang_and_dir_come_from_html_element() {
        let doc = parse_html("<html lang='en' dir='ltr'><body><p>x</p></body></html>");
        let metadata = get_metadata(&doc, Metadata::default());
        assert_eq!(metadata.lang.as_deref(), Some("en"));
        assert_eq!(metadata.dir.as_deref(), Some("ltr"));
    }

    #[test]
    fn excerpt_falls_back_to_first_substantial_paragraph() {
        let doc = parse_html(
            "<body><div id='a'>\
             <p class='byline'>By Ada Lovelace, correspondent at large</p>\
             <p>tiny</p>\
             <p>This is the first real paragraph with enough length to act as an excerpt.</p>\
             </div></body>",
        );
        let div = doc.elements_by_tag(doc.body(), "div")[0];
        let excerpt = excerpt_from_content(&doc, div);
        assert_eq!(
            excerpt.as_deref(),
            Some("This is the first real paragraph with enough length to act as an excerpt.")
        );
    }
}
