use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::env::parse_env_file;

/// Replacement written in place of every secret occurrence
pub const MASK: &str = "[HIDDEN_ENV_VALUE]";

/// Env files scanned at the project root when the configuration names none
pub const DEFAULT_ENV_FILES: &[&str] = &[".env", ".env.local", ".env.development", ".env.production"];

/// Deduplicated secret values, kept in replacement order
/// (longest first, then lexical for determinism)
#[derive(Debug, Clone, Default)]
pub struct SecretSet {
    ordered: Vec<String>,
}

impl SecretSet {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique = BTreeSet::new();

        for value in values {
            let value = value.into();
            if value.is_empty() {
                continue;
            }
            // Masking such a value would rewrite the mask on the next pass
            if MASK.contains(value.as_str()) {
                warn!(
                    "Not masking env value '{}': it occurs inside the mask text",
                    value
                );
                continue;
            }
            if overlaps_mask_edge(&value) {
                warn!(
                    "Not masking env value '{}': it overlaps the edge of the mask text",
                    value
                );
                continue;
            }
            unique.insert(value);
        }

        let mut ordered: Vec<String> = unique.into_iter().collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Self { ordered }
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.ordered.iter().any(|v| v == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    /// Mask every secret occurrence in `content`
    pub fn redact(&self, content: &str) -> String {
        self.redact_counted(content).0
    }

    /// Mask every secret occurrence and report how many were replaced
    pub fn redact_counted(&self, content: &str) -> (String, usize) {
        let mut result = content.to_string();
        let mut count = 0;

        for secret in &self.ordered {
            let hits = result.matches(secret.as_str()).count();
            if hits > 0 {
                result = result.replace(secret.as_str(), MASK);
                count += hits;
            }
        }

        (result, count)
    }
}

/// True when a head of `value` ends the mask or a tail of `value` starts it,
/// so a replacement next to an earlier mask could eat part of that mask
fn overlaps_mask_edge(value: &str) -> bool {
    let value = value.as_bytes();
    let mask = MASK.as_bytes();
    let max = value.len().min(mask.len());

    (1..=max).any(|n| {
        value[..n] == mask[mask.len() - n..] || value[value.len() - n..] == mask[..n]
    })
}

/// Collect secret values from the named env files under `project_root`.
/// Missing files are skipped silently, unreadable ones with a warning.
pub fn collect_secrets<S: AsRef<str>>(project_root: &Path, env_files: &[S]) -> SecretSet {
    let mut values = Vec::new();

    for name in env_files {
        let path = project_root.join(name.as_ref());
        if !path.is_file() {
            continue;
        }

        match parse_env_file(&path) {
            Ok(found) => {
                debug!("Collected {} values from {}", found.len(), path.display());
                values.extend(found);
            }
            Err(e) => warn!("Skipping unreadable env file {}: {}", path.display(), e),
        }
    }

    SecretSet::new(values)
}

/// Mask every occurrence of every secret value, longest values first
pub fn redact(content: &str, secrets: &SecretSet) -> String {
    secrets.redact(content)
}
