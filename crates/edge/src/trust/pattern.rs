//! Compiled origin allow-list patterns
//!
//! A pattern is either a literal host or a host containing exactly one `*`
//! covering a single DNS label: `*.example.com` matches `foo.example.com`
//! but not `foo.bar.example.com` and not `example.com` itself.

use regex::Regex;

/// A compiled allow-list pattern, immutable once built.
#[derive(Debug, Clone)]
pub struct OriginPattern {
    pattern: String,
    regex: Regex,
}

impl OriginPattern {
    /// Compile a pattern string. Returns `None` for patterns that are empty
    /// or carry more than one wildcard; the caller skips those rather than
    /// failing the whole allow-list.
    pub fn compile(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return None;
        }

        let wildcards = pattern.matches('*').count();
        let source = match wildcards {
            0 => format!("^{}$", regex::escape(pattern)),
            // One wildcard: a single DNS label (one or more non-dot chars)
            1 => format!("^{}$", regex::escape(pattern).replace("\\*", "[^.]+")),
            _ => return None,
        };

        let regex = Regex::new(&source).ok()?;
        Some(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Test a normalized origin host against this pattern.
    pub fn matches(&self, host: &str) -> bool {
        self.regex.is_match(host)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// Parse a comma-separated allow-list into compiled patterns, skipping and
/// logging the invalid ones.
pub fn parse_allow_list(raw: &str) -> Vec<OriginPattern> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match OriginPattern::compile(entry) {
            Some(pattern) => Some(pattern),
            None => {
                tracing::warn!(pattern = entry, "skipping invalid origin allow-list pattern");
                None
            }
        })
        .collect()
}
