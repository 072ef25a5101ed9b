//! Small text helpers shared across the pipeline.

use crate::constants::REGEXPS;

/// Trim and collapse runs of whitespace to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    REGEXPS
        .whitespace
        .replace_all(text.trim(), " ")
        .replace(['\n', '\t', '\r'], " ")
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Whether `value` parses as an absolute URL.
pub fn is_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// Whether the text ends in sentence punctuation. Short paragraph siblings
/// are only appended to the article when they read like prose.
pub fn has_sentence_end(text: &str) -> bool {
    let trimmed = text.trim_end();
    trimmed.ends_with('.')
        || trimmed.ends_with('!')
        || trimmed.ends_with('?')
        || trimmed.ends_with('。')
}

/// Unescape the handful of entities that survive into meta-tag content.
/// Element text arrives already decoded by the parser; meta values are
/// sometimes double-escaped upstream.
pub fn unescape_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest.find(';').filter(|&e| e <= 10) else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..end];
        let replacement = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" | "#39" | "#039" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => decode_numeric_entity(entity),
        };
        match replacement {
            Some(ch) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let body = entity.strip_prefix('#')?;
    let code = if let Some(hex) = body.strip_prefix(['x', 'X']) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        body.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_runs_of_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\n  b\tc  "), "a b c");
    }

    #[test]
    fn counts_words() {
        assert_eq!(word_count("one two  three"), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn unescapes_common_entities() {
        assert_eq!(unescape_html_entities("A &amp; B"), "A & B");
        assert_eq!(unescape_html_entities("&quot;hi&quot;"), "\"hi\"");
        assert_eq!(unescape_html_entities("&#x27;s"), "'s");
        assert_eq!(unescape_html_entities("&#233;"), "é");
    }

    #[test]
    fn leaves_unknown_entities_alone() {
        assert_eq!(unescape_html_entities("AT&T &bogus; rest"), "AT&T &bogus; rest");
    }

    #[test]
    fn sentence_end_detection() {
        assert!(has_sentence_end("A short line."));
        assert!(!has_sentence_end("A fragment"));
    }
}
