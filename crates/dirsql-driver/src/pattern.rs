//! SQL `LIKE` patterns over entry names.
//!
//! A `LIKE` pattern is first translated to the host's filename-glob syntax
//! (`%` → `*`, `_` → `?`, backslash escapes become literal characters), and
//! the glob is then compiled to an anchored regex. Case sensitivity is
//! supplied by the store being searched, never forced either way.

use regex::{Regex, RegexBuilder};

use crate::error::{DriverError, DriverResult};

/// Compiled name matcher.
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    /// Compile a SQL `LIKE` pattern.
    pub fn like(pattern: &str, case_sensitive: bool) -> DriverResult<Self> {
        Self::glob(&like_to_glob(pattern), case_sensitive)
    }

    /// Compile a filename glob (`*`, `?`, `[...]`).
    pub fn glob(glob: &str, case_sensitive: bool) -> DriverResult<Self> {
        let regex = RegexBuilder::new(&glob_to_regex(glob))
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| DriverError::malformed(format!("invalid pattern '{}': {}", glob, e)))?;
        Ok(Self { regex })
    }

    /// Match exactly one name (equality under the store's case rules).
    pub fn exact(text: &str, case_sensitive: bool) -> DriverResult<Self> {
        Self::glob(&escape_glob(text), case_sensitive)
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Translate SQL wildcards to glob wildcards.
///
/// `%` → `*`, `_` → `?`, `\x` → literal `x`. Glob metacharacters that are
/// literal in SQL are bracketed so the glob treats them literally too.
pub fn like_to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => glob.push('*'),
            '_' => glob.push('?'),
            '\\' => match chars.next() {
                Some(escaped) => push_literal(&mut glob, escaped),
                None => push_literal(&mut glob, '\\'),
            },
            other => push_literal(&mut glob, other),
        }
    }
    glob
}

fn escape_glob(text: &str) -> String {
    let mut glob = String::with_capacity(text.len());
    for c in text.chars() {
        push_literal(&mut glob, c);
    }
    glob
}

fn push_literal(glob: &mut String, c: char) {
    match c {
        '*' | '?' | '[' | ']' => {
            glob.push('[');
            glob.push(c);
            glob.push(']');
        }
        other => glob.push(other),
    }
}

/// Compile glob syntax to an anchored regex source.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("(?s)^");
    let chars: Vec<char> = glob.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                // A class runs to the next `]`, which may itself be the first member.
                let start = i + 1;
                let mut end = start;
                if end < chars.len() && chars[end] == '!' {
                    end += 1;
                }
                if end < chars.len() && chars[end] == ']' {
                    end += 1;
                }
                while end < chars.len() && chars[end] != ']' {
                    end += 1;
                }
                if end >= chars.len() {
                    // Unterminated: literal bracket.
                    out.push_str(r"\[");
                } else {
                    out.push('[');
                    let mut members = &chars[start..end];
                    if members.first() == Some(&'!') {
                        out.push('^');
                        members = &members[1..];
                    }
                    for &m in members {
                        if m == '-' {
                            out.push('-');
                        } else {
                            out.push_str(&regex::escape(&m.to_string()));
                        }
                    }
                    out.push(']');
                    i = end;
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
        i += 1;
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like(p: &str) -> NamePattern {
        NamePattern::like(p, true).unwrap()
    }

    #[test]
    fn test_percent_suffix() {
        let p = like("%.xml");
        assert!(p.matches("a.xml"));
        assert!(p.matches("a.b.xml"));
        assert!(p.matches(".xml"));
        assert!(!p.matches("a.xmls"));
        assert!(!p.matches("axml"));
    }

    #[test]
    fn test_underscore_is_exactly_one() {
        let p = like("a_c");
        assert!(p.matches("abc"));
        assert!(!p.matches("ac"));
        assert!(!p.matches("abbc"));
    }

    #[test]
    fn test_glob_translation() {
        assert_eq!(like_to_glob("%.xml"), "*.xml");
        assert_eq!(like_to_glob("a_c"), "a?c");
        assert_eq!(like_to_glob(r"100\%"), "100%");
        assert_eq!(like_to_glob("what?*"), "what[?][*]");
    }

    #[test]
    fn test_escaped_wildcards_are_literal() {
        let p = like(r"50\%_off");
        assert!(p.matches("50%xoff"));
        assert!(!p.matches("500xoff"));

        let p = like(r"snake\_case");
        assert!(p.matches("snake_case"));
        assert!(!p.matches("snakeXcase"));
    }

    #[test]
    fn test_glob_metacharacters_in_names() {
        let p = like("[draft]%");
        assert!(p.matches("[draft] notes.txt"));
        assert!(!p.matches("d notes.txt"));

        let p = like("why?");
        assert!(p.matches("why?"));
        assert!(!p.matches("whyX"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let p = like("a.b+(c)");
        assert!(p.matches("a.b+(c)"));
        assert!(!p.matches("aXb+(c)"));
    }

    #[test]
    fn test_case_sensitivity_follows_store() {
        assert!(!NamePattern::like("%.XML", true).unwrap().matches("a.xml"));
        assert!(NamePattern::like("%.XML", false).unwrap().matches("a.xml"));
    }

    #[test]
    fn test_exact() {
        let p = NamePattern::exact("a*b.txt", true).unwrap();
        assert!(p.matches("a*b.txt"));
        assert!(!p.matches("aXXb.txt"));
    }

    #[test]
    fn test_glob_classes() {
        let p = NamePattern::glob("file[0-9].txt", true).unwrap();
        assert!(p.matches("file7.txt"));
        assert!(!p.matches("fileA.txt"));

        let p = NamePattern::glob("[!a]*", true).unwrap();
        assert!(p.matches("b.txt"));
        assert!(!p.matches("a.txt"));
    }
}
