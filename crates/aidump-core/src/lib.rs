//! Core domain logic for aidump
//!
//! This crate contains:
//! - Path rules and the blacklist/whitelist resolver
//! - The dump text format (render and parse)
//! - The parser for AI responses carrying whole-file replacements

pub mod dump;
pub mod error;
pub mod patch;
pub mod resolver;
pub mod rule;

pub use dump::{parse_dump, render_dump, DumpFile};
pub use error::{CoreError, Result};
pub use patch::{parse_patch, PatchBlock};
pub use resolver::{decide, detect_conflicts, ConflictReport, Decision, RuleSet};
pub use rule::{load_rules, PathRule, RuleKind, Specificity};
