use aidump_config::{Config, CONFIG_FILENAME};
use aidump_core::dump::{count_lines, render_dump};
use aidump_core::rule::normalize_path;
use aidump_core::{Decision, DumpFile, RuleSet};
use aidump_security::{collect_secrets, SecretSet};
use aidump_sources::{is_binary, CandidateSource};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of one dump pass
#[derive(Debug, Clone, Serialize)]
pub struct DumpReport {
    /// Dump kind, e.g. `repo-dump` or `git-staged`
    pub kind: String,
    #[serde(skip)]
    pub text: String,
    pub files: Vec<String>,
    pub line_count: usize,
    pub redactions: usize,
    pub excluded_by_rule: usize,
}

impl DumpReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

pub struct Dumper {
    project_root: PathBuf,
    config: Config,
    rules: RuleSet,
    extension_map: BTreeMap<String, String>,
}

impl Dumper {
    /// Validate the configured rules; conflicting rules abort here
    pub fn new(project_root: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let rules = config.rule_set()?;
        let extension_map = config.extension_map();

        Ok(Self {
            project_root: project_root.into(),
            config,
            rules,
            extension_map,
        })
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Build a dump from `source`, limited to `scope_paths` (relative to the
    /// project root) when any are given
    pub fn run(&self, source: &dyn CandidateSource, scope_paths: &[String]) -> Result<DumpReport> {
        let secrets = if self.config.hide_env {
            collect_secrets(&self.project_root, &self.config.env_files)
        } else {
            SecretSet::default()
        };
        debug!("Masking {} env values", secrets.len());

        let mut scopes: Vec<String> = scope_paths
            .iter()
            .map(|p| normalize_path(p).trim_end_matches('/').to_string())
            .collect();
        // The project root itself covers everything
        if scopes.iter().any(|s| s.is_empty() || s == ".") {
            scopes.clear();
        }

        let mut selected = Vec::new();
        let mut excluded_by_rule = 0;

        for candidate in source.candidates()? {
            let rel_path = candidate.rel_path;

            if rel_path == CONFIG_FILENAME || !in_scope(&rel_path, &scopes) {
                continue;
            }

            match self.rules.decide(&rel_path) {
                Decision::Exclude(rule) => {
                    debug!("Excluding {}: {}", rel_path, rule);
                    excluded_by_rule += 1;
                    continue;
                }
                Decision::Include(None) if candidate.gitignored => {
                    debug!("Skipping {}: gitignored", rel_path);
                    continue;
                }
                Decision::Include(Some(rule)) => debug!("Including {}: {}", rel_path, rule),
                Decision::Include(None) => {}
            }

            if is_binary(&self.project_root.join(&rel_path)) {
                debug!("Skipping {}: binary", rel_path);
                continue;
            }

            selected.push(rel_path);
        }

        selected.sort();

        let mut files = Vec::with_capacity(selected.len());
        let mut redactions = 0;

        for rel_path in &selected {
            let content = match std::fs::read(self.project_root.join(rel_path)) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    warn!("Failed to read {}: {}", rel_path, e);
                    format!("[Error reading file: {}]", e)
                }
            };

            let (content, count) = secrets.redact_counted(&content);
            if count > 0 {
                debug!("Masked {} env values in {}", count, rel_path);
            }
            redactions += count;

            files.push(DumpFile::new(rel_path.clone(), content));
        }

        let text = render_dump(&files, &self.extension_map);
        let line_count = if files.is_empty() { 0 } else { count_lines(&text) };

        info!(
            "Dumped {} files ({} lines, {} excluded by rules, {} env values masked)",
            files.len(),
            line_count,
            excluded_by_rule,
            redactions
        );

        Ok(DumpReport {
            kind: source.name().to_string(),
            text,
            files: selected,
            line_count,
            redactions,
            excluded_by_rule,
        })
    }
}

fn in_scope(rel_path: &str, scopes: &[String]) -> bool {
    scopes.is_empty()
        || scopes.iter().any(|scope| {
            rel_path == scope
                || rel_path
                    .strip_prefix(scope.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
}
