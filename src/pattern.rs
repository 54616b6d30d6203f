//! Item pattern matching
//!
//! An item pattern is one or more glob patterns separated by newlines. Lines
//! starting with `!` exclude matching items. An item is selected when at least
//! one include pattern matches and no exclude pattern does. `*` never crosses a
//! `/`; `**` matches any number of path components.

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};

/// Pattern used when the caller supplies none
pub const MATCH_ALL: &str = "**";

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled include/exclude item filter
#[derive(Debug, Clone)]
pub struct ItemPattern {
    source: String,
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl ItemPattern {
    /// Compile a (possibly multi-line) pattern
    pub fn new(source: &str) -> Result<Self> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();

        for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (negated, glob) = match line.strip_prefix('!') {
                Some(rest) => (true, rest.trim()),
                None => (false, line),
            };
            let compiled = Pattern::new(glob).map_err(|e| Error::InvalidPattern {
                pattern: line.to_string(),
                reason: e.msg.to_string(),
            })?;
            if negated {
                excludes.push(compiled);
            } else {
                includes.push(compiled);
            }
        }

        // Exclusions alone select everything else
        if includes.is_empty() {
            includes.push(Pattern::new(MATCH_ALL).map_err(|e| Error::InvalidPattern {
                pattern: MATCH_ALL.to_string(),
                reason: e.msg.to_string(),
            })?);
        }

        Ok(Self {
            source: source.to_string(),
            includes,
            excludes,
        })
    }

    /// Whether an item path (using `/` separators) is selected
    pub fn matches(&self, path: &str) -> bool {
        if self.excludes.iter().any(|p| p.matches_with(path, OPTIONS)) {
            return false;
        }
        self.includes.iter().any(|p| p.matches_with(path, OPTIONS))
    }

    /// The pattern text this filter was compiled from
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Pattern scoped to a single artifact: `<name>/**`
pub fn single_artifact_pattern(artifact_name: &str) -> String {
    format!("{artifact_name}/**")
}

/// Effective pattern for `All` mode: the caller's pattern, or `**` when blank
pub fn all_artifacts_pattern(item_pattern: Option<&str>) -> String {
    match item_pattern.map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => MATCH_ALL.to_string(),
    }
}
