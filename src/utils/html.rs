//! HTML text helpers.
//!
//! - `escape()` - entity escaping for the text renderer
//! - `unescape()` - entity decoding for parsed page text
//! - `normalize_whitespace()` - textContent → display text
//! - `is_raw_text_element()` - elements whose content is not page text

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
/// Unknown entities are left as written.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        // Entity body is at most 10 chars before the terminating ';'
        let Some(semi) = rest[1..].find(';').filter(|&i| i <= 10) else {
            result.push('&');
            rest = &rest[1..];
            continue;
        };
        let entity = &rest[1..=semi];

        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{00A0}'),
            e if e.starts_with("#x") || e.starts_with("#X") => {
                u32::from_str_radix(&e[2..], 16).ok().and_then(char::from_u32)
            }
            e if e.starts_with('#') => e[1..].parse().ok().and_then(char::from_u32),
            _ => None,
        };

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &rest[semi + 2..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);

    Cow::Owned(result)
}

/// Collapse whitespace runs (including NBSP) to one space and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{00A0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Script and style content is not page text.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "noscript" | "template")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"x\"</b>"), "&lt;b&gt;&quot;x&quot;&lt;/b&gt;");
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape_named_and_numeric() {
        assert_eq!(unescape("a &amp; b"), "a & b");
        assert_eq!(unescape("&#65;&#x42;"), "AB");
        assert_eq!(unescape("&lt;h3&gt;"), "<h3>");
    }

    #[test]
    fn test_unescape_leaves_unknown() {
        assert_eq!(unescape("AT&T"), "AT&T");
        assert_eq!(unescape("&bogus;"), "&bogus;");
        assert_eq!(unescape("trailing &"), "trailing &");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  What\n is\u{00A0}\tX? "), "What is X?");
        assert_eq!(normalize_whitespace(" \n "), "");
    }
}
