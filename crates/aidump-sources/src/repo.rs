use aidump_core::{CoreError, Result};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::git::{find_git_root, run_git};
use crate::handler::{Candidate, CandidateSource};

/// Every regular file under the project root, flagged when `.gitignore` hides it
pub struct RepoSource {
    project_root: PathBuf,
}

impl RepoSource {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Files that survive `.gitignore`, `.git/info/exclude` and the global excludes
    fn visible_files(&self) -> HashSet<PathBuf> {
        let mut visible = HashSet::new();

        let walker = WalkBuilder::new(&self.project_root)
            .hidden(false)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        for result in walker {
            match result {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|t| t.is_file()) {
                        visible.insert(entry.into_path());
                    }
                }
                Err(e) => warn!("Gitignore walk error: {}", e),
            }
        }

        visible
    }

    /// Files git already tracks; these count as not ignored even when a
    /// `.gitignore` pattern matches them
    fn tracked_files(&self) -> HashSet<PathBuf> {
        if find_git_root(&self.project_root).is_none() {
            return HashSet::new();
        }

        match run_git(&self.project_root, &["ls-files", "--cached", "-z"]) {
            Ok(paths) => paths
                .into_iter()
                .map(|p| self.project_root.join(p))
                .collect(),
            Err(e) => {
                warn!("Could not list tracked files: {}", e);
                HashSet::new()
            }
        }
    }
}

impl CandidateSource for RepoSource {
    fn name(&self) -> &'static str {
        "repo-dump"
    }

    fn candidates(&self) -> Result<Vec<Candidate>> {
        if !self.project_root.is_dir() {
            return Err(CoreError::Other(anyhow::anyhow!(
                "Project root is not a directory: {}",
                self.project_root.display()
            )));
        }

        let visible = self.visible_files();
        let tracked = self.tracked_files();
        let mut candidates = Vec::new();

        for entry in WalkDir::new(&self.project_root)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable path: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(rel_path) = relative_path(&self.project_root, entry.path()) else {
                continue;
            };
            let gitignored = !visible.contains(entry.path()) && !tracked.contains(entry.path());
            candidates.push(Candidate::new(rel_path, gitignored));
        }

        candidates.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        debug!(
            "Found {} files under {} ({} gitignored)",
            candidates.len(),
            self.project_root.display(),
            candidates.iter().filter(|c| c.gitignored).count()
        );

        Ok(candidates)
    }
}

/// `/`-separated path of `path` below `root`
pub(crate) fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
