//! # pith
//!
//! Extracts the main content of an arbitrary HTML document — the article
//! body a human would read — while discarding navigation, ads, and
//! boilerplate, and produces a structural accessibility snapshot when no
//! reliable article body exists.
//!
//! This crate is the document analysis engine behind content-extraction
//! tools, read-it-later services, and LLM context-preparation pipelines.
//!
//! ## Overview
//!
//! A call runs a fixed pipeline: the document tree is built (or supplied),
//! noise is stripped, metadata is collected from meta tags and JSON-LD,
//! candidate containers are scored and the best one selected — retrying
//! with progressively relaxed heuristics when the result is too short —
//! and the page is classified as an article or not. Non-article pages get
//! a compact role-and-name accessibility tree instead of an article body.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use pith::{Extractor, ExtractOptions};
//!
//! let html = r#"<html><body><article><h1>Title</h1><p>Content...</p></article></body></html>"#;
//!
//! let extractor = Extractor::new(html, Some("https://example.com/article"), None).unwrap();
//! let extraction = extractor.extract().unwrap();
//!
//! println!("Title: {:?}", extraction.title);
//! println!("Byline: {:?}", extraction.byline);
//! if extraction.root.is_some() {
//!     println!("Content: {}", extraction.text_content());
//! }
//! ```
//!
//! ## Accessibility snapshots
//!
//! ```rust,no_run
//! use pith::{Extractor, ExtractOptions, RenderOptions, render_outline};
//!
//! let html = "<html>...</html>";
//! let options = ExtractOptions::builder().build_aria_tree(true).build();
//! let extraction = Extractor::new(html, None, Some(options)).unwrap().extract().unwrap();
//!
//! if let Some(tree) = &extraction.aria {
//!     let outline = render_outline(tree, &extraction.dom, &RenderOptions::default());
//!     println!("{outline}");
//! }
//! ```
//!
//! ## Error Handling
//!
//! Callers always receive an [`Extraction`] except when the configured
//! element limit aborts the call up front. "No content found" is a soft
//! failure: a `None` content root and [`PageType::Other`]. Metadata
//! fields degrade independently to `None`.
//!
//! ## Concurrency
//!
//! The engine is single-threaded and synchronous per call, with no shared
//! mutable state; independent calls can run on separate threads without
//! locking. The retry loop is bounded by the number of relaxable
//! heuristics, so a call performs at most four full sweeps.

mod classify;
mod cleaner;
mod constants;
mod content;
mod error;
mod extraction;
mod extractor;
mod metadata;
mod options;
mod preprocess;
mod scoring;
mod utils;

pub mod aria;
pub mod dom;

// Public exports
pub use aria::{render_outline, AriaNode, AriaRole, AriaTree, RenderOptions};
pub use classify::PageType;
pub use error::{ExtractError, Result};
pub use extraction::{Extraction, ExtractionSummary};
pub use extractor::Extractor;
pub use metadata::Metadata;
pub use options::ExtractOptions;
