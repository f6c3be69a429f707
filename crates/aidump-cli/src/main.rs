mod cli;
mod clipboard;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let ctx = commands::Context::discover(cli.no_clipboard)?;

    match cli.command {
        cli::Commands::Repo { paths } => commands::dump::repo(&ctx, paths),
        cli::Commands::Git { staged, unstaged } => commands::dump::git(&ctx, staged, unstaged),
        cli::Commands::Apply { file, dry_run } => commands::apply::handle(&ctx, file, dry_run),
        cli::Commands::List { tool, json } => commands::history::list(&ctx, tool, json),
        cli::Commands::Restore {
            reference,
            tool,
            dry_run,
        } => commands::history::restore(&ctx, reference, tool, dry_run),
        cli::Commands::Init => commands::init::handle(&ctx),
        cli::Commands::Completions { shell } => commands::completions::handle(shell),
    }
}
