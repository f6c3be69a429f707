//! Blacklist/whitelist resolution
//!
//! The decision for a path is a pure function of the two rule lists:
//! - no rule matches: include
//! - only one side matches: that side decides
//! - both match: the more specific side wins, blacklist on a tie

use serde::Serialize;
use std::fmt;

use crate::rule::{load_rules, normalize_path, PathRule, RuleKind, Specificity};
use crate::{CoreError, Result};

/// Outcome of evaluating every rule against one path
#[derive(Debug, Clone, Copy)]
pub enum Decision<'a> {
    /// `None` when no rule matched at all
    Include(Option<&'a PathRule>),
    Exclude(&'a PathRule),
}

impl<'a> Decision<'a> {
    pub fn is_included(&self) -> bool {
        matches!(self, Decision::Include(_))
    }

    /// True when no rule matched and the path fell through to the default
    pub fn is_default(&self) -> bool {
        matches!(self, Decision::Include(None))
    }

    pub fn winning_rule(&self) -> Option<&'a PathRule> {
        match self {
            Decision::Include(rule) => *rule,
            Decision::Exclude(rule) => Some(rule),
        }
    }
}

impl fmt::Display for Decision<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Include(None) => f.write_str("include (no rule)"),
            Decision::Include(Some(rule)) => write!(f, "include by {}", rule),
            Decision::Exclude(rule) => write!(f, "exclude by {}", rule),
        }
    }
}

/// Two rules of opposite polarity on the same normalized path at the same specificity
#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    pub path: String,
    pub blacklist_rule: String,
    pub blacklist_specificity: Specificity,
    pub whitelist_rule: String,
    pub whitelist_specificity: Specificity,
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" (blacklist \"{}\" at {}; whitelist \"{}\" at {})",
            self.path,
            self.blacklist_rule,
            self.blacklist_specificity,
            self.whitelist_rule,
            self.whitelist_specificity
        )
    }
}

/// Find every blacklist/whitelist pair that targets the identical path.
/// Overlapping prefixes are not conflicts; specificity settles those.
pub fn detect_conflicts(blacklist: &[PathRule], whitelist: &[PathRule]) -> Vec<ConflictReport> {
    let mut conflicts = Vec::new();

    for black in blacklist {
        for white in whitelist {
            if black.normalized() == white.normalized()
                && black.specificity() == white.specificity()
            {
                conflicts.push(ConflictReport {
                    path: black.normalized().to_string(),
                    blacklist_rule: black.raw().to_string(),
                    blacklist_specificity: black.specificity(),
                    whitelist_rule: white.raw().to_string(),
                    whitelist_specificity: white.specificity(),
                });
            }
        }
    }

    conflicts
}

/// Decide a single relative path against both rule lists
pub fn decide<'a>(
    candidate: &str,
    blacklist: &'a [PathRule],
    whitelist: &'a [PathRule],
) -> Decision<'a> {
    let path = normalize_path(candidate);

    match (best_match(&path, blacklist), best_match(&path, whitelist)) {
        (None, None) => Decision::Include(None),
        (Some(black), None) => Decision::Exclude(black),
        (None, Some(white)) => Decision::Include(Some(white)),
        (Some(black), Some(white)) => {
            if white.specificity() > black.specificity() {
                Decision::Include(Some(white))
            } else {
                Decision::Exclude(black)
            }
        }
    }
}

fn best_match<'a>(path: &str, rules: &'a [PathRule]) -> Option<&'a PathRule> {
    rules
        .iter()
        .filter(|rule| rule.matches(path))
        .max_by_key(|rule| rule.specificity())
}

/// Validated blacklist/whitelist snapshot for one configuration
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    blacklist: Vec<PathRule>,
    whitelist: Vec<PathRule>,
}

impl RuleSet {
    /// Build a rule set, refusing configurations with conflicts
    pub fn new(blacklist: Vec<PathRule>, whitelist: Vec<PathRule>) -> Result<Self> {
        let conflicts = detect_conflicts(&blacklist, &whitelist);
        if !conflicts.is_empty() {
            return Err(CoreError::ConfigurationConflict(conflicts));
        }

        Ok(Self {
            blacklist,
            whitelist,
        })
    }

    /// Parse raw rule strings and validate them
    pub fn from_patterns<B, W>(blacklist: &[B], whitelist: &[W]) -> Result<Self>
    where
        B: AsRef<str>,
        W: AsRef<str>,
    {
        Self::new(
            load_rules(blacklist, RuleKind::Blacklist),
            load_rules(whitelist, RuleKind::Whitelist),
        )
    }

    pub fn decide(&self, candidate: &str) -> Decision<'_> {
        decide(candidate, &self.blacklist, &self.whitelist)
    }

    pub fn blacklist(&self) -> &[PathRule] {
        &self.blacklist
    }

    pub fn whitelist(&self) -> &[PathRule] {
        &self.whitelist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(blacklist: &[&str], whitelist: &[&str]) -> RuleSet {
        RuleSet::from_patterns(blacklist, whitelist).unwrap()
    }

    #[test]
    fn test_no_rules_includes() {
        let set = rules(&[], &[]);
        let decision = set.decide("src/main.rs");
        assert!(decision.is_included());
        assert!(decision.is_default());
        assert!(decision.winning_rule().is_none());
    }

    #[test]
    fn test_unmatched_path_includes() {
        let set = rules(&["dist", "*.lock"], &["docs"]);
        assert!(set.decide("src/lib.rs").is_default());
    }

    #[test]
    fn test_single_side_decides() {
        let set = rules(&["dist"], &["tools"]);

        let excluded = set.decide("dist/app.js");
        assert!(!excluded.is_included());
        assert_eq!(excluded.winning_rule().unwrap().raw(), "dist");

        let included = set.decide("tools/gen.py");
        assert!(included.is_included());
        assert!(!included.is_default());
        assert_eq!(included.winning_rule().unwrap().raw(), "tools");
    }

    #[test]
    fn test_whitelisted_subtree_inside_blacklisted_dir() {
        let set = rules(&["vendor/"], &["vendor/libs/"]);

        assert!(!set.decide("vendor/readme.txt").is_included());
        assert!(!set.decide("vendor/other/a.js").is_included());
        assert!(set.decide("vendor/libs/a.js").is_included());
    }

    #[test]
    fn test_deepest_rule_wins() {
        let set = rules(&["vendor/", "vendor/libs/node_modules/"], &["vendor/libs/"]);

        let decision = set.decide("vendor/libs/node_modules/dep.js");
        assert!(!decision.is_included());
        assert_eq!(
            decision.winning_rule().unwrap().normalized(),
            "vendor/libs/node_modules"
        );
        assert!(set.decide("vendor/libs/index.js").is_included());
    }

    #[test]
    fn test_blacklisted_dir_inside_whitelisted_dir() {
        let set = rules(&["docs/internal/"], &["docs/"]);
        assert!(set.decide("docs/guide.md").is_included());
        assert!(!set.decide("docs/internal/plan.md").is_included());
    }

    #[test]
    fn test_trailing_separator_is_irrelevant() {
        let with_slash = rules(&["dist/"], &[]);
        let without_slash = rules(&["dist"], &[]);

        for path in ["dist", "dist/a.js", "dist/x/y.css", "distro/a.js", "src/dist.rs"] {
            assert_eq!(
                with_slash.decide(path).is_included(),
                without_slash.decide(path).is_included(),
                "{}",
                path
            );
        }
    }

    #[test]
    fn test_windows_candidate_paths() {
        let set = rules(&["build"], &[]);
        assert!(!set.decide("build\\out\\a.o").is_included());
        assert!(!set.decide("./build/out/a.o").is_included());
    }

    #[test]
    fn test_literal_beats_wildcard_at_same_depth() {
        let set = rules(&["*.lock"], &["vendor"]);
        assert!(set.decide("vendor/a.lock").is_included());
        assert!(!set.decide("Cargo.lock").is_included());
    }

    #[test]
    fn test_deeper_wildcard_beats_shallower_literal() {
        let set = rules(&["vendor"], &["vendor/*.js"]);
        assert!(set.decide("vendor/a.js").is_included());
        assert!(!set.decide("vendor/a.css").is_included());
    }

    #[test]
    fn test_literal_beats_wildcard_at_equal_depth() {
        let set = rules(&["vendor/libs"], &["vendor/*"]);
        assert!(!set.decide("vendor/libs/a.js").is_included());
        assert!(set.decide("vendor/tools/a.js").is_included());
    }

    #[test]
    fn test_tie_goes_to_blacklist() {
        // Same tier, depth and prefix length but different patterns
        let set = rules(&["src/*.rs"], &["src/?.rs"]);
        assert!(!set.decide("src/a.rs").is_included());
    }

    #[test]
    fn test_decision_is_deterministic() {
        let set = rules(&["vendor/", "*.min.js"], &["vendor/libs/"]);
        let first = set.decide("vendor/libs/app.min.js").is_included();
        for _ in 0..10 {
            assert_eq!(set.decide("vendor/libs/app.min.js").is_included(), first);
        }
    }

    #[test]
    fn test_detect_identical_paths() {
        let black = load_rules(&["src"], RuleKind::Blacklist);
        let white = load_rules(&["src"], RuleKind::Whitelist);
        let conflicts = detect_conflicts(&black, &white);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].path, "src");
        assert_eq!(
            conflicts[0].blacklist_specificity,
            conflicts[0].whitelist_specificity
        );
    }

    #[test]
    fn test_detect_normalizes_separators() {
        let black = load_rules(&["src/"], RuleKind::Blacklist);
        let white = load_rules(&["src"], RuleKind::Whitelist);
        assert_eq!(detect_conflicts(&black, &white).len(), 1);
    }

    #[test]
    fn test_nested_paths_are_not_conflicts() {
        let black = load_rules(&["src"], RuleKind::Blacklist);
        let white = load_rules(&["src/sub"], RuleKind::Whitelist);
        assert!(detect_conflicts(&black, &white).is_empty());
    }

    #[test]
    fn test_rule_set_rejects_conflicts() {
        let err = RuleSet::from_patterns(&["build/"], &["build"]).unwrap_err();
        match err {
            CoreError::ConfigurationConflict(conflicts) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].blacklist_rule, "build/");
                assert_eq!(conflicts[0].whitelist_rule, "build");
            }
            other => panic!("Expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_conflict_message_names_path() {
        let err = RuleSet::from_patterns(&["src"], &["src"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("\"src\""));
        assert!(message.contains("depth 1"));
    }
}
