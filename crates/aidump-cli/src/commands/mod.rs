pub mod apply;
pub mod completions;
pub mod dump;
pub mod history;
pub mod init;

use aidump_config::{find_project_root, Config};
use aidump_engine::{WriteMode, WriteOutcome};
use anyhow::{Context as _, Result};
use std::path::{Component, Path, PathBuf};

/// Where the command runs and against which project
pub struct Context {
    pub cwd: PathBuf,
    pub project_root: PathBuf,
    pub no_clipboard: bool,
}

impl Context {
    pub fn discover(no_clipboard: bool) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read the current directory")?;
        let project_root = find_project_root(&cwd);

        Ok(Self {
            cwd,
            project_root,
            no_clipboard,
        })
    }

    pub fn config(&self) -> Result<Config> {
        Config::load(&self.project_root)
    }
}

/// Path of `path` (relative to `cwd`) below `project_root`, `/`-separated
pub fn project_relative(project_root: &Path, cwd: &Path, path: &Path) -> Result<String> {
    let absolute = lexical_normalize(&cwd.join(path));
    let root = lexical_normalize(project_root);

    let rel = absolute
        .strip_prefix(&root)
        .map_err(|_| anyhow::anyhow!("{} is outside the project root {}", path.display(), root.display()))?;

    Ok(rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Resolve `.` and `..` without touching the filesystem
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Print per-file write results and a summary line
pub fn report_outcomes(outcomes: &[WriteOutcome], mode: WriteMode) {
    for outcome in outcomes {
        let mark = if outcome.is_ok() { "✓" } else { "✗" };
        println!("  {} {}", mark, outcome);
    }

    let written = outcomes.iter().filter(|o| o.is_ok()).count();
    match mode {
        WriteMode::DryRun => println!("Dry run: {}/{} files would be written.", written, outcomes.len()),
        WriteMode::Write => println!("✓ Wrote {}/{} files.", written, outcomes.len()),
    }
}
