use aidump_core::dump::default_extension_map;
use aidump_core::rule::normalize_rule;
use aidump_core::RuleSet;
use aidump_security::DEFAULT_ENV_FILES;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Project configuration file, searched for from the working directory upwards
pub const CONFIG_FILENAME: &str = ".aidump.toml";

/// Always blacklisted unless the project whitelists the same path
pub const IMPLICIT_BLACKLIST: &[&str] = &[".git/", ".gitignore"];

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# aidump configuration
#
# Dumps are stored under <temp>/aidump/<project>/<tool>/ and removed after
# `retention_days`.

# Mask values from the env files below as [HIDDEN_ENV_VALUE]
hide_env = true
env_files = [".env", ".env.local", ".env.development", ".env.production"]

retention_days = 7

# Paths to exclude. Directories with or without a trailing slash, or
# wildcards such as "*.lock".
blacklisted_paths = [
    "node_modules",
    ".venv/",
    "dist/",
    "build/",
    "*.lock",
]

# Paths to always include, even when gitignored. The more specific rule wins:
# blacklisting "build/" and whitelisting "build/config/" keeps only the latter.
whitelisted_paths = [
    # ".github/workflows/",
]

# Extra extension to code fence language mappings, on top of the built-in ones
[extension_lang_map]
# ".custom" = "customlang"
"#;

// ============================================================================
// Config (.aidump.toml)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_hide_env")]
    pub hide_env: bool,

    #[serde(default = "default_env_files")]
    pub env_files: Vec<String>,

    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    #[serde(default)]
    pub blacklisted_paths: Vec<String>,

    #[serde(default)]
    pub whitelisted_paths: Vec<String>,

    /// Extends the built-in map; keys include the leading dot
    #[serde(default)]
    pub extension_lang_map: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hide_env: default_hide_env(),
            env_files: default_env_files(),
            retention_days: default_retention_days(),
            blacklisted_paths: Vec::new(),
            whitelisted_paths: Vec::new(),
            extension_lang_map: BTreeMap::new(),
        }
    }
}

fn default_hide_env() -> bool {
    true
}

fn default_env_files() -> Vec<String> {
    DEFAULT_ENV_FILES.iter().map(|s| s.to_string()).collect()
}

fn default_retention_days() -> u64 {
    7
}

impl Config {
    /// Load the project config, falling back to the user-level config and
    /// then to defaults
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        let path = project_root.join(CONFIG_FILENAME);
        if path.exists() {
            info!("Using configuration file {}", path.display());
            return Self::load_from_path(&path);
        }

        if let Some(global) = Self::global_config_path().filter(|p| p.exists()) {
            info!("Using configuration file {}", global.display());
            return Self::load_from_path(&global);
        }

        debug!("No {} found, using defaults", CONFIG_FILENAME);
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// User-level config, used when the project has none
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "aidump", "aidump")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Validated blacklist/whitelist, including the implicit blacklist entries
    pub fn rule_set(&self) -> aidump_core::Result<RuleSet> {
        let whitelisted: Vec<String> = self
            .whitelisted_paths
            .iter()
            .map(|p| normalize_rule(p))
            .collect();

        let mut blacklist = self.blacklisted_paths.clone();
        for implicit in IMPLICIT_BLACKLIST {
            if !whitelisted.contains(&normalize_rule(implicit)) {
                blacklist.push(implicit.to_string());
            }
        }

        RuleSet::from_patterns(&blacklist, &self.whitelisted_paths)
    }

    /// Built-in extension map extended by the configured one
    pub fn extension_map(&self) -> BTreeMap<String, String> {
        let mut map = default_extension_map();
        map.extend(
            self.extension_lang_map
                .iter()
                .map(|(ext, lang)| (ext.clone(), lang.clone())),
        );
        map
    }

    /// Saturates, so a huge `retention_days` means "keep forever"
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_days.saturating_mul(24 * 60 * 60))
    }
}

// ============================================================================
// Project discovery
// ============================================================================

/// Directory holding the config file, searching upwards from `start`
pub fn find_config_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_FILENAME).is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Project root: the config directory if there is one, otherwise `start`
pub fn find_project_root(start: &Path) -> PathBuf {
    find_config_root(start).unwrap_or_else(|| start.to_path_buf())
}

/// Write the commented default config into `project_root`
pub fn init(project_root: &Path) -> anyhow::Result<PathBuf> {
    let path = project_root.join(CONFIG_FILENAME);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(path)
}
