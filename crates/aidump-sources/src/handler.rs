//! Candidate source trait

use aidump_core::Result;

/// A file that may end up in a dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path relative to the project root, `/`-separated
    pub rel_path: String,
    /// Hidden by `.gitignore`; only a whitelist rule brings it back
    pub gitignored: bool,
}

impl Candidate {
    pub fn new(rel_path: impl Into<String>, gitignored: bool) -> Self {
        Self {
            rel_path: rel_path.into(),
            gitignored,
        }
    }
}

/// Trait for enumerating the files a dump is selected from
pub trait CandidateSource {
    /// Dump kind, used in stored dump file names
    fn name(&self) -> &'static str;

    /// Every candidate, sorted by relative path
    fn candidates(&self) -> Result<Vec<Candidate>>;
}
