//! Manifest-style URL match patterns.
//!
//! `*` matches any (possibly empty) substring; every other character is
//! literal. A pattern must match the whole URL.
//!
//! ```ignore
//! let p = UrlPattern::new("*://chat.deepseek.com/*")?;
//! assert!(p.matches("https://chat.deepseek.com/a/chat/s/42"));
//! ```

use std::fmt;

use regex::Regex;

#[derive(Clone)]
pub struct UrlPattern {
    glob: String,
    regex: Regex,
}

impl UrlPattern {
    pub fn new(glob: &str) -> Result<Self, regex::Error> {
        let body = glob
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{body}$"))?;
        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    pub fn as_str(&self) -> &str {
        &self.glob
    }
}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UrlPattern").field(&self.glob).finish()
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.glob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_matches_any_substring() {
        let p = UrlPattern::new("*://chat.deepseek.com/*").unwrap();
        assert!(p.matches("https://chat.deepseek.com/a/chat/s/42"));
        assert!(p.matches("http://chat.deepseek.com/"));
        assert!(!p.matches("https://chat.deepseek.com"));
    }

    #[test]
    fn test_dot_is_literal() {
        let p = UrlPattern::new("*://chatgpt.com/*").unwrap();
        assert!(!p.matches("https://chatgptxcom/c/1"));
    }

    #[test]
    fn test_anchored_both_ends() {
        let p = UrlPattern::new("https://chatgpt.com/*").unwrap();
        assert!(!p.matches("xhttps://chatgpt.com/c/1"));
        assert!(!p.matches("https://chatgpt.com.evil.net/"));
        assert!(p.matches("https://chatgpt.com/c/1?x=1"));
    }

    #[test]
    fn test_regex_metacharacters_are_escaped() {
        let p = UrlPattern::new("http://localhost:3000/chat?id=*").unwrap();
        assert!(p.matches("http://localhost:3000/chat?id=7"));
        assert!(!p.matches("http://localhost:3000/cha"));
    }
}
