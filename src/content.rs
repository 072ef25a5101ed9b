//! Candidate scoring and selection.
//!
//! The extraction loop is an explicit state machine over a bounded set of
//! attempts. Each attempt is a pure function of (pristine tree snapshot,
//! flag set): it clones the preprocessed tree, sweeps and prunes it,
//! scores candidates, assembles the article container, and cleans it. If
//! the result is below the character threshold the attempt is logged and
//! the loop retries with the first still-active flag disabled — most
//! permissive configuration last. When every configuration falls short the
//! longest recorded attempt wins, or the whole call soft-fails.

use bitflags::bitflags;
use tracing::debug;

use crate::cleaner;
use crate::constants::{DEFAULT_TAGS_TO_SCORE, PHRASING_TAGS, REGEXPS};
use crate::dom::{Cursor, Document, NodeData, NodeId};
use crate::options::ExtractOptions;
use crate::scoring;

bitflags! {
    /// Heuristics active during one extraction attempt. All on initially;
    /// retries relax them one at a time in declaration order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GrabFlags: u32 {
        const STRIP_UNLIKELYS = 1 << 0;
        const WEIGHT_CLASSES = 1 << 1;
        const CLEAN_CONDITIONALLY = 1 << 2;
    }
}

/// A scored candidate, ranked by score × (1 − link density).
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub node: NodeId,
    pub score: f64,
}

/// Result of a successful grab: the attempt's tree (the content container
/// lives inside it), the container id, the ranked candidates the
/// classifier consults, and a byline captured during the sweep.
#[derive(Debug)]
pub struct GrabOutcome {
    pub doc: Document,
    pub root: NodeId,
    pub candidates: Vec<Candidate>,
    pub byline: Option<String>,
    pub text_length: usize,
}

/// Run the attempt loop against a preprocessed tree. `title` drives
/// near-duplicate heading removal. Returns `None` when no configuration
/// produced any text at all.
pub fn grab_article(
    pristine: &Document,
    title: &str,
    options: &ExtractOptions,
) -> Option<GrabOutcome> {
    let mut flags = GrabFlags::all();
    let mut attempts: Vec<GrabOutcome> = Vec::new();

    loop {
        let outcome = attempt(pristine.clone(), flags, title, options);

        if outcome.text_length >= options.char_threshold {
            debug!(
                flags = ?flags,
                length = outcome.text_length,
                "content accepted"
            );
            return Some(outcome);
        }
        attempts.push(outcome);

        // Relax the first still-active flag; once all are off, fall back
        // to the longest attempt recorded across the run.
        let relaxed = [
            GrabFlags::STRIP_UNLIKELYS,
            GrabFlags::WEIGHT_CLASSES,
            GrabFlags::CLEAN_CONDITIONALLY,
        ]
        .into_iter()
        .find(|&flag| flags.contains(flag));

        match relaxed {
            Some(flag) => {
                flags.remove(flag);
                debug!(disabled = ?flag, "retrying with relaxed flags");
            }
            None => {
                attempts.sort_by(|a, b| b.text_length.cmp(&a.text_length));
                return attempts.into_iter().next().filter(|a| a.text_length > 0);
            }
        }
    }
}

/// One pure extraction attempt over a fresh tree clone.
fn attempt(
    mut doc: Document,
    flags: GrabFlags,
    title: &str,
    options: &ExtractOptions,
) -> GrabOutcome {
    let byline = sweep_and_prune(&mut doc, flags, title);
    let candidates = score_candidates(&mut doc, flags, options.nb_top_candidates);
    let top = select_top_candidate(&mut doc, &candidates);
    let root = assemble_article(&mut doc, top);
    cleaner::prep_article(&mut doc, root, flags, options);
    let text_length = doc.normalized_text(root).chars().count();
    GrabOutcome {
        doc,
        root,
        candidates,
        byline,
        text_length,
    }
}

/// Single forward traversal removing what scoring must never see:
/// invisible nodes, modal dialogs, the byline (captured once), a heading
/// duplicating the title, unlikely candidates, and DIV noise shapes.
fn sweep_and_prune(doc: &mut Document, flags: GrabFlags, title: &str) -> Option<String> {
    let body = doc.body();
    let mut byline: Option<String> = None;
    let mut cursor = Cursor::new(body);
    let mut current = cursor.advance(doc);

    while let Some(id) = current {
        if !doc.is_element(id) {
            current = cursor.advance(doc);
            continue;
        }

        if !doc.is_visible(id) {
            current = cursor.remove_advance(doc);
            continue;
        }

        if is_modal_dialog(doc, id) {
            current = cursor.remove_advance(doc);
            continue;
        }

        if byline.is_none() {
            if let Some(text) = byline_text(doc, id) {
                byline = Some(text);
                current = cursor.remove_advance(doc);
                continue;
            }
        }

        if is_duplicate_title_heading(doc, id, title) {
            current = cursor.remove_advance(doc);
            continue;
        }

        if flags.contains(GrabFlags::STRIP_UNLIKELYS) && is_unlikely_candidate(doc, id) {
            current = cursor.remove_advance(doc);
            continue;
        }

        if doc.has_tag(id, "div") {
            // A DIV wrapping exactly one P with little link text is that P.
            if let Some(p) = single_p_child(doc, id) {
                if scoring::link_density(doc, id) < 0.25 {
                    doc.replace(id, p);
                    cursor.jump(p);
                    current = cursor.advance(doc);
                    continue;
                }
            }
            if has_only_phrasing_content(doc, id) {
                doc.retag(id, "p");
            } else {
                wrap_stray_text_children(doc, id);
            }
        }

        current = cursor.advance(doc);
    }

    byline
}

fn is_modal_dialog(doc: &Document, id: NodeId) -> bool {
    let role_dialog = doc
        .attr(id, "role")
        .is_some_and(|r| r.eq_ignore_ascii_case("dialog") || r.eq_ignore_ascii_case("alertdialog"));
    role_dialog
        || doc
            .attr(id, "aria-modal")
            .is_some_and(|m| m.eq_ignore_ascii_case("true"))
}

/// Byline shape: `rel=author`, `itemprop~=name`, or a byline keyword in
/// class/id, carrying a short run of text.
fn byline_text(doc: &Document, id: NodeId) -> Option<String> {
    let el = doc.element(id)?;
    let has_rel_author = el
        .attr("rel")
        .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("author")));
    let has_name_itemprop = el
        .attr("itemprop")
        .is_some_and(|ip| ip.split_whitespace().any(|p| p.eq_ignore_ascii_case("name")));
    let matches_pattern = {
        let match_string = el.match_string();
        !match_string.is_empty() && REGEXPS.byline.is_match(&match_string)
    };
    if !(has_rel_author || has_name_itemprop || matches_pattern) {
        return None;
    }
    let text = doc.normalized_text(id);
    let len = text.chars().count();
    if len > 0 && len < 100 {
        Some(text)
    } else {
        None
    }
}

fn is_duplicate_title_heading(doc: &Document, id: NodeId, title: &str) -> bool {
    if title.is_empty() {
        return false;
    }
    if !(doc.has_tag(id, "h1") || doc.has_tag(id, "h2")) {
        return false;
    }
    scoring::text_similarity(&doc.normalized_text(id), title) >= crate::metadata::TITLE_SIMILARITY
}

/// Unlikely-candidate check, with the maybe-candidate override and the
/// table/code exemption (the node itself or anything it sits inside).
fn is_unlikely_candidate(doc: &Document, id: NodeId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    if crate::constants::UNLIKELY_EXEMPT_TAGS.contains(&el.tag.as_str()) {
        return false;
    }
    if doc
        .ancestors(id, 0)
        .iter()
        .any(|&a| doc.has_tag(a, "table") || doc.has_tag(a, "code") || doc.has_tag(a, "pre"))
    {
        return false;
    }
    if let Some(role) = el.attr("role") {
        if matches!(
            role.to_ascii_lowercase().as_str(),
            "menu" | "menubar" | "complementary" | "navigation" | "alert" | "alertdialog"
        ) {
            return true;
        }
    }
    let match_string = el.match_string();
    if match_string.is_empty() {
        return false;
    }
    REGEXPS.unlikely_candidates.is_match(&match_string)
        && !REGEXPS.ok_maybe_its_a_candidate.is_match(&match_string)
}

/// Exactly one element child, a `<p>`, with no stray text siblings.
fn single_p_child(doc: &Document, id: NodeId) -> Option<NodeId> {
    let mut p = None;
    for child in doc.children(id) {
        match doc.data(child) {
            NodeData::Element(el) => {
                if el.tag != "p" || p.is_some() {
                    return None;
                }
                p = Some(child);
            }
            NodeData::Text(text) => {
                if !text.trim().is_empty() {
                    return None;
                }
            }
        }
    }
    p
}

/// Phrasing content, recursively: text, phrasing tags, or `a`/`del`/`ins`
/// whose children are all phrasing.
fn is_phrasing_content(doc: &Document, id: NodeId) -> bool {
    match doc.data(id) {
        NodeData::Text(_) => true,
        NodeData::Element(el) => {
            if PHRASING_TAGS.contains(&el.tag.as_str()) {
                return true;
            }
            matches!(el.tag.as_str(), "a" | "del" | "ins")
                && doc
                    .children(id)
                    .iter()
                    .all(|&child| is_phrasing_content(doc, child))
        }
    }
}

fn has_only_phrasing_content(doc: &Document, id: NodeId) -> bool {
    doc.children(id)
        .iter()
        .all(|&child| is_phrasing_content(doc, child))
}

/// Promote bare text runs inside a mixed DIV into paragraph wrappers so
/// they participate in scoring.
fn wrap_stray_text_children(doc: &mut Document, id: NodeId) {
    for child in doc.children(id) {
        let is_stray_text = match doc.data(child) {
            NodeData::Text(text) => !text.trim().is_empty(),
            NodeData::Element(_) => false,
        };
        if is_stray_text {
            let wrapper = doc.create_element("p");
            doc.insert_before(child, wrapper);
            doc.append(wrapper, child);
        }
    }
}

/// Score prose-bearing elements and propagate to ancestors, then rank by
/// score × (1 − link density) and keep the top N.
fn score_candidates(doc: &mut Document, flags: GrabFlags, nb_top: usize) -> Vec<Candidate> {
    let body = doc.body();
    let weigh_classes = flags.contains(GrabFlags::WEIGHT_CLASSES);

    let to_score: Vec<NodeId> = doc
        .elements_by_tag(body, "*")
        .into_iter()
        .filter(|&id| {
            doc.tag(id)
                .is_some_and(|tag| DEFAULT_TAGS_TO_SCORE.contains(&tag))
        })
        .collect();

    let mut scored: Vec<NodeId> = Vec::new();

    for element in to_score {
        let text = doc.normalized_text(element);
        let char_len = text.chars().count();
        if char_len < 25 {
            continue;
        }

        let mut score = 1.0;
        score += scoring::comma_count(&text) as f64;
        score += (char_len / 100).min(3) as f64;

        for (level, ancestor) in doc.ancestors(element, 3).into_iter().enumerate() {
            if !doc.is_element(ancestor) || doc.has_tag(ancestor, "html") {
                break;
            }
            let initialized = doc
                .element(ancestor)
                .is_some_and(|el| el.content_score.is_some());
            if !initialized {
                let tag_score = doc
                    .tag(ancestor)
                    .map(scoring::initial_score)
                    .unwrap_or(0.0);
                let weight = scoring::class_weight(doc, ancestor, weigh_classes);
                if let Some(el) = doc.element_mut(ancestor) {
                    el.content_score = Some(tag_score + weight);
                }
                scored.push(ancestor);
            }
            let divisor = match level {
                0 => 1.0,
                1 => 2.0,
                level => (level * 3) as f64,
            };
            if let Some(el) = doc.element_mut(ancestor) {
                if let Some(existing) = el.content_score.as_mut() {
                    *existing += score / divisor;
                }
            }
            if ancestor == body {
                break;
            }
        }
    }

    let mut candidates: Vec<Candidate> = scored
        .into_iter()
        .map(|node| {
            let raw = doc
                .element(node)
                .and_then(|el| el.content_score)
                .unwrap_or(0.0);
            let adjusted = raw * (1.0 - scoring::link_density(doc, node));
            if let Some(el) = doc.element_mut(node) {
                el.content_score = Some(adjusted);
            }
            Candidate {
                node,
                score: adjusted,
            }
        })
        .collect();

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(nb_top.max(1));
    candidates
}

fn content_score(doc: &Document, id: NodeId) -> Option<f64> {
    doc.element(id).and_then(|el| el.content_score)
}

/// Pick the top candidate: BODY synthesis when scoring found nothing (or
/// chose the body itself), shared-ancestor promotion, the higher-scoring
/// ancestor walk, and single-child chain collapse.
fn select_top_candidate(doc: &mut Document, candidates: &[Candidate]) -> NodeId {
    let body = doc.body();

    let top = match candidates.first() {
        Some(c) if c.node != body => c.node,
        _ => return synthesize_body_wrapper(doc),
    };

    let mut top = top;

    // Group competing candidates under a common container when at least
    // three of the other top candidates share an ancestor of the winner.
    let others: Vec<Vec<NodeId>> = candidates[1..]
        .iter()
        .map(|c| doc.ancestors(c.node, 0))
        .collect();
    for ancestor in doc.ancestors(top, 0) {
        if ancestor == body {
            break;
        }
        let shared = others.iter().filter(|chain| chain.contains(&ancestor)).count();
        if shared >= 3 {
            debug!(?ancestor, shared, "promoted to shared ancestor");
            top = ancestor;
            break;
        }
    }

    // An ancestor that out-scores the candidate is the better container.
    let top_score = content_score(doc, top).unwrap_or(0.0);
    let mut best_score = top_score;
    for ancestor in doc.ancestors(top, 0) {
        if ancestor == body {
            break;
        }
        if let Some(score) = content_score(doc, ancestor) {
            if score > best_score {
                best_score = score;
                top = ancestor;
            }
        }
    }

    // Collapse single-child chains upward.
    loop {
        let Some(parent) = doc.parent(top) else {
            break;
        };
        if parent == body || !doc.is_element(parent) {
            break;
        }
        let meaningful: Vec<NodeId> = doc
            .children(parent)
            .into_iter()
            .filter(|&c| match doc.data(c) {
                NodeData::Element(_) => true,
                NodeData::Text(text) => !text.trim().is_empty(),
            })
            .collect();
        if meaningful.len() != 1 {
            break;
        }
        top = parent;
    }

    top
}

/// When scoring produced nothing usable, the whole body becomes the
/// candidate — wrapped in a synthetic DIV so later passes never retag or
/// detach the body element itself.
fn synthesize_body_wrapper(doc: &mut Document) -> NodeId {
    let body = doc.body();
    let wrapper = doc.create_element("div");
    doc.reparent_children(body, wrapper);
    doc.append(body, wrapper);
    if let Some(el) = doc.element_mut(wrapper) {
        el.content_score = Some(0.0);
    }
    wrapper
}

/// Build the final container from the top candidate plus qualifying
/// siblings.
fn assemble_article(doc: &mut Document, top: NodeId) -> NodeId {
    let Some(parent) = doc.parent(top) else {
        return top;
    };

    let top_score = content_score(doc, top).unwrap_or(0.0);
    let threshold = (top_score * 0.2).max(10.0);
    let top_class = doc
        .element(top)
        .and_then(|el| el.class.clone())
        .unwrap_or_default();

    let mut keep: Vec<NodeId> = Vec::new();
    for sibling in doc.children(parent) {
        if sibling == top {
            keep.push(sibling);
            continue;
        }
        if !doc.is_element(sibling) {
            continue;
        }

        // Siblings sharing the winner's class get a proportional bonus.
        let mut bonus = 0.0;
        if !top_class.is_empty() {
            let same_class = doc
                .element(sibling)
                .and_then(|el| el.class.as_deref())
                .is_some_and(|class| class == top_class);
            if same_class {
                bonus = top_score * 0.2;
            }
        }
        let sibling_score = content_score(doc, sibling).unwrap_or(0.0) + bonus;

        if sibling_score >= threshold {
            keep.push(sibling);
            continue;
        }

        if doc.has_tag(sibling, "p") {
            let text = doc.normalized_text(sibling);
            let len = text.chars().count();
            let density = scoring::link_density(doc, sibling);
            if (len > 80 && density < 0.25)
                || (len > 0 && len <= 80 && density == 0.0 && crate::utils::has_sentence_end(&text))
            {
                keep.push(sibling);
            }
        }
    }

    if keep.len() <= 1 {
        return top;
    }

    let container = doc.create_element("div");
    doc.insert_before(keep[0], container);
    for node in keep {
        doc.append(container, node);
    }
    if let Some(el) = doc.element_mut(container) {
        el.content_score = Some(top_score);
    }
    container
}
