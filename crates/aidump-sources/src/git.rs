use aidump_core::{CoreError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::handler::{Candidate, CandidateSource};
use crate::repo::relative_path;

/// Which working-tree changes a git dump covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeScope {
    /// Staged, unstaged and untracked
    #[default]
    All,
    /// Only what `git add` has staged
    Staged,
    /// Unstaged modifications plus untracked files
    Unstaged,
}

/// Files changed in the working tree of a git repository
pub struct GitChangesSource {
    git_root: PathBuf,
    project_root: PathBuf,
    scope: ChangeScope,
}

impl GitChangesSource {
    pub fn new(git_root: impl Into<PathBuf>, project_root: impl Into<PathBuf>, scope: ChangeScope) -> Self {
        Self {
            git_root: canonical(git_root.into()),
            project_root: canonical(project_root.into()),
            scope,
        }
    }

    fn changed_paths(&self) -> Result<BTreeSet<String>> {
        let mut paths = BTreeSet::new();

        if matches!(self.scope, ChangeScope::All | ChangeScope::Staged) {
            paths.extend(run_git(&self.git_root, &["diff", "--name-only", "-z", "--cached"])?);
        }
        if matches!(self.scope, ChangeScope::All | ChangeScope::Unstaged) {
            paths.extend(run_git(&self.git_root, &["diff", "--name-only", "-z"])?);
            paths.extend(run_git(
                &self.git_root,
                &["ls-files", "--others", "--exclude-standard", "-z"],
            )?);
        }

        Ok(paths)
    }
}

impl CandidateSource for GitChangesSource {
    fn name(&self) -> &'static str {
        match self.scope {
            ChangeScope::All => "git-all",
            ChangeScope::Staged => "git-staged",
            ChangeScope::Unstaged => "git-unstaged",
        }
    }

    fn candidates(&self) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for git_path in self.changed_paths()? {
            let absolute = self.git_root.join(&git_path);

            // Deleted files are reported by git but have nothing to dump
            if !absolute.is_file() {
                debug!("Skipping {}: not on disk", git_path);
                continue;
            }

            match relative_path(&self.project_root, &absolute) {
                Some(rel_path) => candidates.push(Candidate::new(rel_path, false)),
                None => debug!("Skipping {}: outside the project root", git_path),
            }
        }

        candidates.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Ok(candidates)
    }
}

/// Root of the git repository containing `start`, if any
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(start)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let root = String::from_utf8(output.stdout).ok()?;
    let root = root.trim();
    if root.is_empty() {
        None
    } else {
        Some(PathBuf::from(root))
    }
}

pub(crate) fn run_git(cwd: &Path, args: &[&str]) -> Result<Vec<String>> {
    let output = Command::new("git")
        .arg("-C")
        .arg(cwd)
        .args(args)
        .output()
        .map_err(|e| CoreError::Other(anyhow::anyhow!("Failed to run git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CoreError::Other(anyhow::anyhow!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(split_nul(&String::from_utf8_lossy(&output.stdout)))
}

fn split_nul(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn canonical(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}
