//! Temp-dir dump store

use crate::{Result, StorageError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, warn};

const STORE_DIR: &str = "aidump";
const DUMP_EXTENSION: &str = "txt";

/// A stored dump file
#[derive(Debug, Clone)]
pub struct DumpEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

impl DumpEntry {
    /// Modification time in local time, falling back to UTC
    pub fn modified_at(&self) -> OffsetDateTime {
        let utc = OffsetDateTime::from(self.modified);
        match time::UtcOffset::local_offset_at(utc) {
            Ok(offset) => utc.to_offset(offset),
            Err(_) => utc,
        }
    }

    /// `YYYY-MM-DD HH:MM:SS` for listings
    pub fn modified_display(&self) -> String {
        let at = self.modified_at();
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        at.format(&format)
            .unwrap_or_else(|_| at.unix_timestamp().to_string())
    }
}

/// Dumps of one tool for one project:
/// `<temp>/aidump/<project>-<hash8>/<tool>/<YYYYMMDD_HHMMSS>-<kind>.txt`
pub struct DumpStore {
    dir: PathBuf,
}

impl DumpStore {
    pub fn for_project(project_root: &Path, tool: &str) -> Self {
        let root = fs::canonicalize(project_root).unwrap_or_else(|_| project_root.to_path_buf());
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let hash = blake3::hash(root.to_string_lossy().as_bytes()).to_hex();

        Self::with_dir(
            std::env::temp_dir()
                .join(STORE_DIR)
                .join(format!("{}-{}", name, &hash[..8]))
                .join(tool),
        )
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `text` as a new dump named after the current time and `kind`
    pub fn save(&self, kind: &str, text: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self
            .dir
            .join(format!("{}-{}.{}", timestamp(), kind, DUMP_EXTENSION));
        fs::write(&path, text)?;

        debug!("Saved dump to {}", path.display());
        Ok(path)
    }

    /// Remove dumps older than `max_age`, returning how many were removed
    pub fn cleanup(&self, max_age: Duration) -> Result<usize> {
        let mut removed = 0;

        for entry in self.entries()? {
            let age = entry.modified.elapsed().unwrap_or_default();
            if age < max_age {
                continue;
            }

            match fs::remove_file(&entry.path) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove old dump {}: {}", entry.path.display(), e),
            }
        }

        if removed > 0 {
            debug!("Removed {} old dumps from {}", removed, self.dir.display());
        }
        Ok(removed)
    }

    /// Stored dumps, newest first
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<DumpEntry>> {
        let mut entries = self.entries()?;
        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));

        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    /// Find a dump by reference: empty or `1` is the newest, `N` the N-th newest,
    /// anything else an exact file name
    pub fn resolve(&self, reference: &str) -> Result<DumpEntry> {
        let reference = reference.trim();
        let entries = self.list(None)?;

        if entries.is_empty() {
            return Err(StorageError::DumpNotFound(format!(
                "no dumps in {}",
                self.dir.display()
            )));
        }

        if reference.is_empty() {
            return Ok(entries[0].clone());
        }

        if let Some(entry) = entries.iter().find(|e| e.name == reference) {
            return Ok(entry.clone());
        }

        match reference.parse::<usize>() {
            Ok(n) if n >= 1 && n <= entries.len() => Ok(entries[n - 1].clone()),
            _ => Err(StorageError::DumpNotFound(reference.to_string())),
        }
    }

    fn entries(&self) -> Result<Vec<DumpEntry>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for item in fs::read_dir(&self.dir)? {
            let item = item?;
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DUMP_EXTENSION) {
                continue;
            }

            let metadata = item.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            entries.push(DumpEntry {
                name: item.file_name().to_string_lossy().into_owned(),
                path,
                modified: metadata.modified()?,
                size: metadata.len(),
            });
        }

        Ok(entries)
    }
}

fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description!("[year][month][day]_[hour][minute][second]");
    now.format(&format)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Size with one decimal and a binary unit, e.g. `1.5 KB`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    for unit in &UNITS[..UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} {}", size, UNITS[UNITS.len() - 1])
}
