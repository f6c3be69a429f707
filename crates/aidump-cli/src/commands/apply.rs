use aidump_engine::{apply, WriteMode};
use anyhow::{Context as _, Result};
use std::io::Read;
use std::path::PathBuf;

use super::{report_outcomes, Context};
use crate::clipboard;

pub fn handle(ctx: &Context, file: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let response = read_response(ctx, file)?;
    if response.trim().is_empty() {
        anyhow::bail!("Nothing to apply: the input is empty");
    }

    let mode = if dry_run { WriteMode::DryRun } else { WriteMode::Write };
    let outcomes = apply(&ctx.project_root, &response, mode);

    if outcomes.is_empty() {
        anyhow::bail!("No file blocks found. Each code block must be preceded by its file path.");
    }

    report_outcomes(&outcomes, mode);
    Ok(())
}

fn read_response(ctx: &Context, file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() == "-" => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
        Some(path) => {
            let path = ctx.cwd.join(path);
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None if ctx.no_clipboard => {
            anyhow::bail!("--no-clipboard given without --file; nothing to read the answer from")
        }
        None => clipboard::read_text(),
    }
}
