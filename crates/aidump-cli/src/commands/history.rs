use aidump_engine::{restore as restore_dump, WriteMode};
use aidump_storage::{format_size, DumpEntry, DumpStore};
use anyhow::{Context as _, Result};
use serde_json::json;
use std::io::Write;

use super::{report_outcomes, Context};
use crate::cli::Tool;

const LIST_LIMIT: usize = 20;

pub fn list(ctx: &Context, tool: Tool, as_json: bool) -> Result<()> {
    let store = DumpStore::for_project(&ctx.project_root, tool.dir_name());
    let entries = store.list(Some(LIST_LIMIT))?;

    if as_json {
        let items: Vec<_> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                json!({
                    "index": i + 1,
                    "name": entry.name,
                    "path": entry.path,
                    "modified": entry.modified_display(),
                    "size": entry.size,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No {} dumps for this project.", tool.dir_name());
        return Ok(());
    }

    println!("Recent {} dumps ({}):\n", tool.dir_name(), entries.len());
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "  {}. [{}] {} ({})",
            i + 1,
            entry.modified_display(),
            entry.path.display(),
            format_size(entry.size)
        );
    }

    print!("\nNumber to restore (Enter to cancel): ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input)? == 0 {
        println!();
        return Ok(());
    }

    let choice = input.trim();
    if choice.is_empty() {
        return Ok(());
    }

    match choice.parse::<usize>() {
        Ok(n) if n >= 1 && n <= entries.len() => restore_entry(ctx, &entries[n - 1], WriteMode::Write),
        _ => {
            println!("Invalid selection: {}", choice);
            Ok(())
        }
    }
}

pub fn restore(ctx: &Context, reference: Option<String>, tool: Tool, dry_run: bool) -> Result<()> {
    let store = DumpStore::for_project(&ctx.project_root, tool.dir_name());
    let entry = store
        .resolve(reference.as_deref().unwrap_or(""))
        .context("Use `aidump list` to see the available dumps")?;

    let mode = if dry_run { WriteMode::DryRun } else { WriteMode::Write };
    restore_entry(ctx, &entry, mode)
}

fn restore_entry(ctx: &Context, entry: &DumpEntry, mode: WriteMode) -> Result<()> {
    let text = std::fs::read_to_string(&entry.path)
        .with_context(|| format!("Failed to read {}", entry.path.display()))?;

    let outcomes = restore_dump(&ctx.project_root, &text, mode);
    if outcomes.is_empty() {
        anyhow::bail!("No files found in {}", entry.name);
    }

    println!("Restoring {} files from {}", outcomes.len(), entry.name);
    report_outcomes(&outcomes, mode);
    Ok(())
}
