use aidump_config::Config;
use aidump_engine::{DumpReport, Dumper};
use aidump_sources::{find_git_root, CandidateSource, ChangeScope, GitChangesSource, RepoSource};
use aidump_storage::DumpStore;
use aidump_tokens::{format_tokens, TokenEstimator};
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use super::{project_relative, Context};
use crate::cli::Tool;
use crate::clipboard;

pub fn repo(ctx: &Context, paths: Vec<PathBuf>) -> Result<()> {
    let scope_paths = paths
        .iter()
        .map(|p| project_relative(&ctx.project_root, &ctx.cwd, p))
        .collect::<Result<Vec<_>>>()?;

    let source = RepoSource::new(&ctx.project_root);
    run(ctx, &source, &scope_paths, Tool::Repo)
}

pub fn git(ctx: &Context, staged: bool, unstaged: bool) -> Result<()> {
    let git_root = find_git_root(&ctx.project_root)
        .with_context(|| format!("{} is not inside a git repository", ctx.project_root.display()))?;

    let scope = if staged {
        ChangeScope::Staged
    } else if unstaged {
        ChangeScope::Unstaged
    } else {
        ChangeScope::All
    };

    let source = GitChangesSource::new(git_root, &ctx.project_root, scope);
    run(ctx, &source, &[], Tool::Git)
}

fn run(ctx: &Context, source: &dyn CandidateSource, scope_paths: &[String], tool: Tool) -> Result<()> {
    let config = ctx.config()?;
    let dumper = Dumper::new(&ctx.project_root, config.clone())?;
    let report = dumper.run(source, scope_paths)?;

    if report.is_empty() {
        eprintln!("No files matched.");
        return Ok(());
    }

    log_tokens(&report);
    deliver(ctx, &config, &report, tool)
}

fn log_tokens(report: &DumpReport) {
    match TokenEstimator::new() {
        Ok(estimator) => info!(
            "Dump size: ~{} tokens (cl100k_base)",
            format_tokens(estimator.estimate(&report.text))
        ),
        Err(e) => warn!("Token estimate unavailable: {}", e),
    }
}

/// Store the dump, then hand it to the clipboard or stdout
fn deliver(ctx: &Context, config: &Config, report: &DumpReport, tool: Tool) -> Result<()> {
    let store = DumpStore::for_project(&ctx.project_root, tool.dir_name());

    match store.cleanup(config.retention()) {
        Ok(0) => {}
        Ok(removed) => info!("Removed {} dumps older than {} days", removed, config.retention_days),
        Err(e) => warn!("Failed to clean up old dumps: {}", e),
    }

    let saved = store
        .save(&report.kind, &report.text)
        .with_context(|| format!("Failed to save dump in {}", store.dir().display()))?;

    if ctx.no_clipboard {
        println!("{}", report.text);
    } else if let Err(e) = clipboard::copy_text(&report.text) {
        warn!("{:#}", e);
        eprintln!("Clipboard unavailable; the dump is still saved.");
    } else {
        eprintln!("✓ Copied {} files to the clipboard", report.files.len());
    }

    eprintln!("  Saved to {}", saved.display());
    Ok(())
}
