//! Blacklist/whitelist path rules
//!
//! A rule is either a literal path (matched on whole path segments, so `vendor`
//! covers `vendor/x.js` but not `vendor2/x.js`) or a shell-style wildcard
//! matched against the full relative path.

use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::fmt;
use tracing::warn;

use crate::{CoreError, Result};

const WILDCARD_CHARS: &[char] = &['*', '?', '['];

/// `*` crosses `/`, like `fnmatch`.
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Blacklist,
    Whitelist,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Blacklist => f.write_str("blacklist"),
            RuleKind::Whitelist => f.write_str("whitelist"),
        }
    }
}

/// Wildcard rules rank below literal rules of the same depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Wildcard,
    Literal,
}

/// How precisely a rule targets a path. Compared field by field:
/// segment depth first, then tier, then literal prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Specificity {
    pub depth: usize,
    pub tier: Tier,
    pub prefix_len: usize,
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tier = match self.tier {
            Tier::Wildcard => "wildcard",
            Tier::Literal => "literal",
        };
        write!(
            f,
            "depth {}, {}, prefix {}",
            self.depth, tier, self.prefix_len
        )
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal,
    Glob(Pattern),
}

/// A single normalized rule from `blacklisted_paths` or `whitelisted_paths`
#[derive(Debug, Clone)]
pub struct PathRule {
    raw: String,
    normalized: String,
    kind: RuleKind,
    directory: bool,
    matcher: Matcher,
    specificity: Specificity,
}

impl PathRule {
    /// Normalize and compile a raw rule string
    pub fn new(raw: &str, kind: RuleKind) -> Result<Self> {
        let trimmed = raw.trim();
        let normalized = normalize_rule(trimmed);

        if normalized.is_empty() {
            return Err(CoreError::MalformedRule {
                rule: raw.to_string(),
                reason: "rule is empty after normalization".to_string(),
            });
        }

        let directory = trimmed.ends_with('/') || trimmed.ends_with('\\');

        let matcher = if is_wildcard(&normalized) {
            match Pattern::new(&normalized) {
                Ok(pattern) => Matcher::Glob(pattern),
                Err(e) => {
                    warn!(
                        "Rule '{}' is not a valid glob ({}), matching it literally",
                        raw, e
                    );
                    Matcher::Literal
                }
            }
        } else {
            Matcher::Literal
        };

        let specificity = match &matcher {
            Matcher::Literal => Specificity {
                depth: segment_count(&normalized),
                tier: Tier::Literal,
                prefix_len: normalized.len(),
            },
            Matcher::Glob(_) => Specificity {
                depth: segment_count(&normalized),
                tier: Tier::Wildcard,
                prefix_len: normalized.find(WILDCARD_CHARS).unwrap_or(normalized.len()),
            },
        };

        Ok(Self {
            raw: raw.to_string(),
            normalized,
            kind,
            directory,
            matcher,
            specificity,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Whether the raw rule was written with a trailing separator
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.matcher, Matcher::Glob(_))
    }

    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Check a candidate path, already normalized with [`normalize_path`]
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.matcher {
            Matcher::Literal => {
                candidate == self.normalized
                    || candidate
                        .strip_prefix(self.normalized.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            Matcher::Glob(pattern) => pattern.matches_with(candidate, GLOB_OPTIONS),
        }
    }
}

impl fmt::Display for PathRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rule \"{}\"", self.kind, self.raw)
    }
}

/// Parse a list of raw rules, skipping malformed ones with a warning
pub fn load_rules<S: AsRef<str>>(patterns: &[S], kind: RuleKind) -> Vec<PathRule> {
    patterns
        .iter()
        .filter_map(|p| match PathRule::new(p.as_ref(), kind) {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!("Skipping {} entry: {}", kind, e);
                None
            }
        })
        .collect()
}

/// Forward slashes, no leading `./`, no trailing separator
pub fn normalize_rule(raw: &str) -> String {
    let path = normalize_path(raw);
    path.trim_end_matches('/').to_string()
}

/// Bring a candidate relative path into the form rules are matched against
pub fn normalize_path(path: &str) -> String {
    let mut path = path.replace('\\', "/");
    while let Some(stripped) = path.strip_prefix("./") {
        path = stripped.to_string();
    }
    path
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.contains(WILDCARD_CHARS)
}

fn segment_count(normalized: &str) -> usize {
    normalized.split('/').filter(|s| !s.is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(raw: &str) -> PathRule {
        PathRule::new(raw, RuleKind::Blacklist).unwrap()
    }

    #[test]
    fn test_normalization() {
        assert_eq!(rule("dist/").normalized(), "dist");
        assert_eq!(rule("dist").normalized(), "dist");
        assert_eq!(rule("./src\\gen\\").normalized(), "src/gen");
        assert!(rule("dist/").is_directory());
        assert!(!rule("dist").is_directory());
    }

    #[test]
    fn test_empty_rule_is_malformed() {
        let err = PathRule::new(" / ", RuleKind::Whitelist).unwrap_err();
        assert!(matches!(err, CoreError::MalformedRule { .. }));
    }

    #[test]
    fn test_literal_matches_on_segment_boundary() {
        let vendor = rule("vendor");
        assert!(vendor.matches("vendor"));
        assert!(vendor.matches("vendor/x.js"));
        assert!(vendor.matches("vendor/a/b/c.js"));
        assert!(!vendor.matches("vendor2/x.js"));
        assert!(!vendor.matches("src/vendor/x.js"));
    }

    #[test]
    fn test_wildcard_crosses_segments() {
        let lock = rule("*.lock");
        assert!(lock.is_wildcard());
        assert!(lock.matches("Cargo.lock"));
        assert!(lock.matches("frontend/yarn.lock"));
        assert!(!lock.matches("Cargo.toml"));
    }

    #[test]
    fn test_invalid_glob_falls_back_to_literal() {
        let odd = rule("weird[dir");
        assert!(!odd.is_wildcard());
        assert!(odd.matches("weird[dir/file.txt"));
        assert_eq!(odd.specificity().tier, Tier::Literal);
    }

    #[test]
    fn test_specificity_order() {
        let star_lock = rule("*.lock").specificity();
        let vendor = rule("vendor").specificity();
        let vendor_js = rule("vendor/*.js").specificity();
        let vendor_libs = rule("vendor/libs").specificity();

        assert!(star_lock < vendor);
        assert!(vendor < vendor_js);
        assert!(vendor_js < vendor_libs);
        assert_eq!(vendor_js.prefix_len, "vendor/".len());
    }

    #[test]
    fn test_wildcard_prefix_breaks_ties() {
        let short = rule("src/*").specificity();
        let long = rule("src/gen*").specificity();
        assert!(short < long);
    }

    #[test]
    fn test_load_rules_skips_malformed() {
        let rules = load_rules(&["dist/", "", "*.log"], RuleKind::Blacklist);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].normalized(), "dist");
        assert_eq!(rules[1].normalized(), "*.log");
    }
}
