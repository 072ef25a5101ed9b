//! The extraction orchestrator.
//!
//! Ties the pipeline together: parse guard → metadata (raw tree) →
//! preprocess → candidate grab → classification → accessibility snapshot.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pith::{Extractor, ExtractOptions};
//!
//! let html = std::fs::read_to_string("article.html").unwrap();
//! let extractor = Extractor::new(&html, Some("https://example.com/article"), None)?;
//! let extraction = extractor.extract()?;
//!
//! println!("Title: {:?}", extraction.title);
//! println!("Page type: {:?}", extraction.page_type);
//! println!("Text: {}", extraction.text_content());
//! # Ok::<(), pith::ExtractError>(())
//! ```

use tracing::debug;
use url::Url;

use crate::aria;
use crate::classify::{classify, PageType};
use crate::content;
use crate::dom::parse::{self, ParserFn};
use crate::dom::Document;
use crate::error::{ExtractError, Result};
use crate::extraction::Extraction;
use crate::metadata::{self, Metadata};
use crate::options::ExtractOptions;
use crate::preprocess;

/// The main extraction engine.
///
/// One instance per document; [`Extractor::extract`] consumes it. Each
/// call owns its tree exclusively, so independent calls can run on
/// separate threads with no shared state.
pub struct Extractor {
    doc: Document,
    options: ExtractOptions,
}

impl Extractor {
    /// Parse `html` with the built-in parser adapter.
    ///
    /// `url` is the base for relative-link resolution downstream; it must
    /// be absolute when given.
    pub fn new(html: &str, url: Option<&str>, options: Option<ExtractOptions>) -> Result<Self> {
        let doc = parse::parse_html(html);
        Self::from_parsed(doc, url, options)
    }

    /// Use a caller-built tree directly, skipping the built-in parser.
    pub fn from_tree(doc: Document, options: Option<ExtractOptions>) -> Self {
        Self {
            doc,
            options: options.unwrap_or_default(),
        }
    }

    /// Parse with a caller-supplied alternate parser. A bare element
    /// subtree from the parser is wrapped in a synthetic `html`/`body`
    /// shell.
    pub fn with_parser(
        html: &str,
        parser: &ParserFn,
        url: Option<&str>,
        options: Option<ExtractOptions>,
    ) -> Result<Self> {
        let doc = parse::into_document(parser(html));
        Self::from_parsed(doc, url, options)
    }

    fn from_parsed(
        mut doc: Document,
        url: Option<&str>,
        options: Option<ExtractOptions>,
    ) -> Result<Self> {
        if let Some(url) = url {
            let parsed =
                Url::parse(url).map_err(|_| ExtractError::InvalidUrl(url.to_string()))?;
            doc.set_base_url(parsed);
        }
        Ok(Self {
            doc,
            options: options.unwrap_or_default(),
        })
    }

    /// Run the pipeline.
    ///
    /// Always produces an [`Extraction`] except when the document exceeds
    /// the configured element limit. "No article found" is a soft failure:
    /// a `None` content root with [`PageType::Other`].
    pub fn extract(mut self) -> Result<Extraction> {
        if self.options.max_elems_to_parse > 0 {
            let found = self.doc.element_count();
            if found > self.options.max_elems_to_parse {
                return Err(ExtractError::TooManyElements {
                    found,
                    limit: self.options.max_elems_to_parse,
                });
            }
        }

        let json_ld = if self.options.disable_json_ld {
            Metadata::default()
        } else {
            metadata::get_json_ld(&self.doc)
        };
        let meta = metadata::get_metadata(&self.doc, json_ld);

        // The snapshot covers page structure the preprocessor strips
        // (navigation, header, footer), so it is built from the raw tree.
        // Preprocessing and the grab attempts only detach or append nodes,
        // never re-index, so node ids stay valid across all three trees.
        let may_need_aria = self.options.build_aria_tree
            || self.options.forced_page_type != Some(PageType::Article);
        let raw = may_need_aria.then(|| self.doc.clone());

        preprocess::strip_noise(&mut self.doc);

        let title = meta.title.clone().unwrap_or_default();
        let grabbed = content::grab_article(&self.doc, &title, &self.options);

        // The grab loop returns its longest attempt even when every
        // configuration fell short; at the API level content below the
        // threshold is a soft failure (null root, OTHER).
        let grabbed = grabbed.filter(|o| o.text_length >= self.options.char_threshold);

        match grabbed {
            Some(outcome) => {
                let page_type = self.options.forced_page_type.unwrap_or_else(|| {
                    classify(
                        &outcome.doc,
                        Some(outcome.root),
                        &outcome.candidates,
                        self.options.char_threshold,
                    )
                });
                let aria = if self.options.build_aria_tree || page_type == PageType::Other {
                    raw.as_ref()
                        .map(|raw| aria::compress(aria::build_aria_tree(raw)))
                } else {
                    None
                };
                debug!(?page_type, length = outcome.text_length, "extraction done");

                let excerpt = meta
                    .excerpt
                    .clone()
                    .or_else(|| metadata::excerpt_from_content(&outcome.doc, outcome.root));
                let node_count = outcome.doc.elements_by_tag(outcome.root, "*").len();

                Ok(Extraction {
                    title: meta.title,
                    byline: meta.byline.or(outcome.byline),
                    excerpt,
                    site_name: meta.site_name,
                    published_time: meta.published_time,
                    lang: meta.lang,
                    dir: meta.dir,
                    dom: outcome.doc,
                    root: Some(outcome.root),
                    node_count,
                    page_type,
                    aria,
                })
            }
            None => {
                let page_type = self
                    .options
                    .forced_page_type
                    .unwrap_or(PageType::Other);
                let aria = if self.options.build_aria_tree || page_type == PageType::Other {
                    raw.as_ref()
                        .map(|raw| aria::compress(aria::build_aria_tree(raw)))
                } else {
                    None
                };
                debug!("extraction soft-failed, no content root");

                Ok(Extraction {
                    title: meta.title,
                    byline: meta.byline,
                    excerpt: meta.excerpt,
                    site_name: meta.site_name,
                    published_time: meta.published_time,
                    lang: meta.lang,
                    dir: meta.dir,
                    dom: self.doc,
                    root: None,
                    node_count: 0,
                    page_type,
                    aria,
                })
            }
        }
    }
}
