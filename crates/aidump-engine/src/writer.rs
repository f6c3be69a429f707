use aidump_core::rule::normalize_path;
use aidump_core::{parse_dump, parse_patch};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Write,
    /// Report what would be written without touching the disk
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    Created,
    Updated,
    /// Path points outside the project root
    Rejected(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: String,
    pub status: WriteStatus,
}

impl WriteOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, WriteStatus::Created | WriteStatus::Updated)
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            WriteStatus::Created => write!(f, "created {}", self.path),
            WriteStatus::Updated => write!(f, "updated {}", self.path),
            WriteStatus::Rejected(reason) => write!(f, "rejected {}: {}", self.path, reason),
            WriteStatus::Failed(reason) => write!(f, "failed {}: {}", self.path, reason),
        }
    }
}

/// Write every file of a dump back under `project_root`
pub fn restore(project_root: &Path, dump_text: &str, mode: WriteMode) -> Vec<WriteOutcome> {
    let files = parse_dump(dump_text);
    debug!("Restoring {} files", files.len());

    files
        .into_iter()
        .map(|file| write_file(project_root, &file.path, &file.content, mode))
        .collect()
}

/// Replace whole files with the fenced blocks of an AI response
pub fn apply(project_root: &Path, response: &str, mode: WriteMode) -> Vec<WriteOutcome> {
    let blocks = parse_patch(response);
    debug!("Applying {} blocks", blocks.len());

    blocks
        .into_iter()
        .map(|block| {
            let mut content = block.content;
            if !content.is_empty() && !content.ends_with('\n') {
                content.push('\n');
            }
            write_file(project_root, &block.path, &content, mode)
        })
        .collect()
}

fn write_file(project_root: &Path, rel_path: &str, content: &str, mode: WriteMode) -> WriteOutcome {
    let rel_path = normalize_path(rel_path);

    let target = match resolve_target(project_root, &rel_path) {
        Ok(target) => target,
        Err(reason) => {
            warn!("Refusing to write {}: {}", rel_path, reason);
            return WriteOutcome {
                path: rel_path,
                status: WriteStatus::Rejected(reason),
            };
        }
    };

    let existed = target.exists();
    let status = match mode {
        WriteMode::DryRun => Ok(()),
        WriteMode::Write => write_contents(&target, content),
    };

    let status = match status {
        Ok(()) if existed => WriteStatus::Updated,
        Ok(()) => WriteStatus::Created,
        Err(e) => {
            warn!("Failed to write {}: {}", target.display(), e);
            WriteStatus::Failed(e.to_string())
        }
    };

    WriteOutcome {
        path: rel_path,
        status,
    }
}

fn write_contents(target: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, content)
}

/// Absolute target for `rel_path`, refusing anything that leaves the root
fn resolve_target(project_root: &Path, rel_path: &str) -> Result<PathBuf, String> {
    let rel = Path::new(rel_path);
    if rel_path.is_empty() {
        return Err("empty path".to_string());
    }

    for component in rel.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err("path contains '..'".to_string()),
            Component::RootDir | Component::Prefix(_) => {
                return Err("absolute paths are not allowed".to_string())
            }
        }
    }

    let target = project_root.join(rel);

    let root = fs::canonicalize(project_root).map_err(|e| e.to_string())?;
    ensure_inside(&root, &target, 0)?;

    Ok(target)
}

/// Reject `path` when its nearest existing ancestor, followed through any
/// symlinks (dangling ones included), lies outside `root`
fn ensure_inside(root: &Path, path: &Path, hops: usize) -> Result<(), String> {
    const MAX_LINK_HOPS: usize = 40;

    if hops > MAX_LINK_HOPS {
        return Err("too many levels of symbolic links".to_string());
    }

    let mut existing = path;
    while fs::symlink_metadata(existing).is_err() {
        existing = match existing.parent() {
            Some(parent) => parent,
            None => return Ok(()),
        };
    }

    match fs::canonicalize(existing) {
        Ok(real) if real.starts_with(root) => Ok(()),
        Ok(_) => Err("path resolves outside the project root".to_string()),
        Err(_) => {
            // Dangling link: writing would create its target
            let link = fs::read_link(existing).map_err(|e| e.to_string())?;
            let dest = match existing.parent() {
                Some(parent) => parent.join(link),
                None => link,
            };
            ensure_inside(root, &lexical_normalize(&dest), hops + 1)
        }
    }
}

/// Fold `.` and `..` without touching the filesystem
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
