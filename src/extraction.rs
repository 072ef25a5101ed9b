//! The extraction result record.

use serde::Serialize;

use crate::aria::AriaTree;
use crate::classify::PageType;
use crate::dom::{Document, NodeId};

/// Everything one extraction call produced.
///
/// The content root (when present) lives inside [`Extraction::dom`]; the
/// pair is what downstream serializers walk. The metadata fields
/// serialize independently of the tree.
#[derive(Debug)]
pub struct Extraction {
    /// The article title, from metadata precedence plus refinement.
    pub title: Option<String>,

    /// Author name(s), from meta tags, `rel=author` anchors, JSON-LD, or
    /// the byline node captured during the content sweep.
    pub byline: Option<String>,

    /// Short description: metadata description, else the first substantial
    /// paragraph of the extracted content.
    pub excerpt: Option<String>,

    /// Name of the site or publication.
    pub site_name: Option<String>,

    /// Publication timestamp as found (typically ISO 8601).
    pub published_time: Option<String>,

    /// Language code from the `<html>`/`<body>` `lang` attribute.
    pub lang: Option<String>,

    /// Text direction from the `<html>` `dir` attribute.
    pub dir: Option<String>,

    /// The tree the selected content lives in.
    pub dom: Document,

    /// The selected content container, or `None` when no content met the
    /// threshold after every retry.
    pub root: Option<NodeId>,

    /// Elements in the selected content subtree.
    pub node_count: usize,

    /// Article or not.
    pub page_type: PageType,

    /// Accessibility snapshot; present when requested or when the page
    /// classified as [`PageType::Other`].
    pub aria: Option<AriaTree>,
}

impl Extraction {
    /// Plain text of the selected content, whitespace-normalized. Empty
    /// when extraction soft-failed.
    pub fn text_content(&self) -> String {
        self.root
            .map(|root| self.dom.normalized_text(root))
            .unwrap_or_default()
    }

    /// Metadata in serializable form.
    pub fn summary(&self) -> ExtractionSummary<'_> {
        ExtractionSummary {
            title: self.title.as_deref(),
            byline: self.byline.as_deref(),
            excerpt: self.excerpt.as_deref(),
            site_name: self.site_name.as_deref(),
            published_time: self.published_time.as_deref(),
            lang: self.lang.as_deref(),
            dir: self.dir.as_deref(),
            node_count: self.node_count,
            page_type: self.page_type,
            has_content: self.root.is_some(),
        }
    }
}

/// Serializable view of an [`Extraction`]'s metadata.
#[derive(Debug, Serialize)]
pub struct ExtractionSummary<'a> {
    pub title: Option<&'a str>,
    pub byline: Option<&'a str>,
    pub excerpt: Option<&'a str>,
    pub site_name: Option<&'a str>,
    pub published_time: Option<&'a str>,
    pub lang: Option<&'a str>,
    pub dir: Option<&'a str>,
    pub node_count: usize,
    pub page_type: PageType,
    pub has_content: bool,
}
