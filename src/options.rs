//! Configuration options for the extraction engine.
//!
//! This module provides [`ExtractOptions`] and [`ExtractOptionsBuilder`]
//! for configuring thresholds, limits, and optional outputs.
//!
//! ## Example
//!
//! ```rust
//! use pith::{ExtractOptions, Extractor};
//!
//! let html = "<html><body><article><p>Content...</p></article></body></html>";
//!
//! // Using default options
//! let extractor = Extractor::new(html, None, None).unwrap();
//!
//! // Using builder for custom options
//! let options = ExtractOptions::builder()
//!     .char_threshold(250)
//!     .nb_top_candidates(10)
//!     .build_aria_tree(true)
//!     .build();
//!
//! let extractor = Extractor::new(html, None, Some(options)).unwrap();
//! ```

use regex::Regex;

use crate::classify::PageType;

/// Configuration for one extraction call.
///
/// Controls the scoring thresholds, the element safety limit, and which
/// optional outputs are produced.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum number of elements to parse.
    ///
    /// A safety limit bounding the worst-case cost on pathological input,
    /// checked once before any work begins. Set to 0 to disable the limit.
    ///
    /// Default: `0` (no limit)
    pub max_elems_to_parse: usize,

    /// Number of top candidates to consider when selecting content.
    ///
    /// Default: `5`
    pub nb_top_candidates: usize,

    /// Minimum number of characters for accepted article content.
    ///
    /// If an extraction attempt yields fewer characters, the engine
    /// retries with progressively relaxed heuristics. `500` suits article
    /// extraction; `250` is the documented alternative for
    /// snapshot-oriented callers.
    ///
    /// Default: `500`
    pub char_threshold: usize,

    /// Skip classification and treat every document as this page type.
    ///
    /// Default: `None` (classify normally)
    pub forced_page_type: Option<PageType>,

    /// Always build the accessibility tree, even for articles.
    ///
    /// The tree is built regardless whenever classification yields
    /// [`PageType::Other`].
    ///
    /// Default: `false`
    pub build_aria_tree: bool,

    /// Disable JSON-LD metadata extraction.
    ///
    /// Default: `false`
    pub disable_json_ld: bool,

    /// Custom regex for allowed video embed URLs.
    ///
    /// Overrides the built-in video-host allowlist used during article
    /// cleanup.
    ///
    /// Default: `None` (use the built-in set)
    pub allowed_video_regex: Option<Regex>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_elems_to_parse: 0,
            nb_top_candidates: 5,
            char_threshold: 500,
            forced_page_type: None,
            build_aria_tree: false,
            disable_json_ld: false,
            allowed_video_regex: None,
        }
    }
}

impl ExtractOptions {
    /// Creates a new builder for ExtractOptions
    pub fn builder() -> ExtractOptionsBuilder {
        ExtractOptionsBuilder::default()
    }
}

/// Builder for [`ExtractOptions`].
#[derive(Default)]
pub struct ExtractOptionsBuilder {
    max_elems_to_parse: Option<usize>,
    nb_top_candidates: Option<usize>,
    char_threshold: Option<usize>,
    forced_page_type: Option<PageType>,
    build_aria_tree: Option<bool>,
    disable_json_ld: Option<bool>,
    allowed_video_regex: Option<Regex>,
}

impl ExtractOptionsBuilder {
    /// Set the maximum number of elements to parse
    pub fn max_elems_to_parse(mut self, max: usize) -> Self {
        self.max_elems_to_parse = Some(max);
        self
    }

    /// Set the number of top candidates to consider
    pub fn nb_top_candidates(mut self, nb: usize) -> Self {
        self.nb_top_candidates = Some(nb);
        self
    }

    /// Set the character threshold
    pub fn char_threshold(mut self, threshold: usize) -> Self {
        self.char_threshold = Some(threshold);
        self
    }

    /// Force the page type, skipping classification
    pub fn forced_page_type(mut self, page_type: PageType) -> Self {
        self.forced_page_type = Some(page_type);
        self
    }

    /// Always build the accessibility tree
    pub fn build_aria_tree(mut self, build: bool) -> Self {
        self.build_aria_tree = Some(build);
        self
    }

    /// Disable JSON-LD extraction
    pub fn disable_json_ld(mut self, disable: bool) -> Self {
        self.disable_json_ld = Some(disable);
        self
    }

    /// Set the allowed video regex
    pub fn allowed_video_regex(mut self, regex: Regex) -> Self {
        self.allowed_video_regex = Some(regex);
        self
    }

    /// Build the ExtractOptions
    pub fn build(self) -> ExtractOptions {
        let defaults = ExtractOptions::default();
        ExtractOptions {
            max_elems_to_parse: self
                .max_elems_to_parse
                .unwrap_or(defaults.max_elems_to_parse),
            nb_top_candidates: self.nb_top_candidates.unwrap_or(defaults.nb_top_candidates),
            char_threshold: self.char_threshold.unwrap_or(defaults.char_threshold),
            forced_page_type: self.forced_page_type.or(defaults.forced_page_type),
            build_aria_tree: self.build_aria_tree.unwrap_or(defaults.build_aria_tree),
            disable_json_ld: self.disable_json_ld.unwrap_or(defaults.disable_json_ld),
            allowed_video_regex: self.allowed_video_regex.or(defaults.allowed_video_regex),
        }
    }
}
