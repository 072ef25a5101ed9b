//! Shared regular expressions and tag tables.

use once_cell::sync::Lazy;
use regex::Regex;

/// Compiled once per process; immutable after first use, so concurrent
/// extraction calls share it without locking.
pub struct Regexps {
    /// Class/id markers that make an element an unlikely candidate.
    pub unlikely_candidates: Regex,
    /// Overrides `unlikely_candidates` when it also matches.
    pub ok_maybe_its_a_candidate: Regex,
    /// Class/id keywords that raise an element's weight.
    pub positive: Regex,
    /// Class/id keywords that lower an element's weight.
    pub negative: Regex,
    /// Byline markers in class/id/rel/itemprop values.
    pub byline: Regex,
    /// Video-host allowlist for embeds kept during cleanup.
    pub videos: Regex,
    /// Schema.org Article subtypes trusted in JSON-LD blocks.
    pub json_ld_article_types: Regex,
    /// Accepted values of `@context` (or its `@vocab`).
    pub schema_org: Regex,
    /// Ad/affiliate/sponsor markers for the preprocessor.
    pub ad_markers: Regex,
    /// Inline styles that hide an element.
    pub hidden_style: Regex,
    /// Comma characters across scripts, for the base content score.
    pub commas: Regex,
    /// In-page anchors get a reduced link-density weight.
    pub hash_url: Regex,
    /// Hierarchical title separators, space-padded.
    pub title_separator: Regex,
    /// Runs of whitespace.
    pub whitespace: Regex,
}

pub static REGEXPS: Lazy<Regexps> = Lazy::new(|| Regexps {
    unlikely_candidates: Regex::new(
        r"(?i)-ad-|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote",
    )
    .unwrap(),
    ok_maybe_its_a_candidate: Regex::new(r"(?i)and|article|body|column|content|main|mathjax|shadow")
        .unwrap(),
    positive: Regex::new(
        r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story",
    )
    .unwrap(),
    negative: Regex::new(
        r"(?i)-ad-|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|footer|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|widget",
    )
    .unwrap(),
    byline: Regex::new(r"(?i)byline|author|dateline|writtenby|p-author").unwrap(),
    videos: Regex::new(
        r"(?i)//(www\.)?((dailymotion|youtube|youtube-nocookie|player\.vimeo|v\.qq)\.com|(archive|upload\.wikimedia)\.org|player\.twitch\.tv)",
    )
    .unwrap(),
    json_ld_article_types: Regex::new(
        r"^Article$|^AdvertiserContentArticle$|^NewsArticle$|^AnalysisNewsArticle$|^AskPublicNewsArticle$|^BackgroundNewsArticle$|^OpinionNewsArticle$|^ReportageNewsArticle$|^ReviewNewsArticle$|^Report$|^SatiricalArticle$|^ScholarlyArticle$|^MedicalScholarlyArticle$|^SocialMediaPosting$|^BlogPosting$|^LiveBlogPosting$|^DiscussionForumPosting$|^TechArticle$|^APIReference$",
    )
    .unwrap(),
    schema_org: Regex::new(r"^https?://schema\.org/?$").unwrap(),
    ad_markers: Regex::new(
        r"(?i)(^|[-_ ])(ad|ads|advert|advertisement|advertising|adsense|sponsor|sponsored|affiliate|promo|promoted|outbrain|taboola|doubleclick)([-_ ]|$)",
    )
    .unwrap(),
    hidden_style: Regex::new(r"(?i)display\s*:\s*none|visibility\s*:\s*hidden").unwrap(),
    commas: Regex::new(r"[,\u{060C}\u{FE50}\u{FE10}\u{FE51}\u{2E41}\u{2E32}\u{FF0C}]").unwrap(),
    hash_url: Regex::new(r"^#.+").unwrap(),
    title_separator: Regex::new(r" [\|\-\\/>»] ").unwrap(),
    whitespace: Regex::new(r"\s{2,}").unwrap(),
});

/// Structural and non-content tags removed by the preprocessor, in removal
/// order.
pub const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "form", "button", "object", "embed", "applet", "map",
    "dialog", "nav", "header", "footer", "aside",
];

/// Tags whose text seeds the candidate scores.
pub const DEFAULT_TAGS_TO_SCORE: &[&str] =
    &["section", "h2", "h3", "h4", "h5", "h6", "p", "td", "pre"];

/// Phrasing content: a DIV holding only these (and text) renders as a
/// paragraph and is retagged to one.
pub const PHRASING_TAGS: &[&str] = &[
    "abbr", "audio", "b", "bdo", "br", "button", "cite", "code", "data", "datalist", "dfn", "em",
    "embed", "i", "img", "input", "kbd", "label", "mark", "math", "meter", "noscript", "object",
    "output", "progress", "q", "ruby", "samp", "script", "select", "small", "span", "strong",
    "sub", "sup", "textarea", "time", "var", "wbr",
];

/// Tags exempt from unlikely-candidate stripping.
pub const UNLIKELY_EXEMPT_TAGS: &[&str] = &["table", "code", "pre", "body", "html"];
