use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aidump")]
#[command(about = "Dump a project for AI chats and apply the answers back", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Do not copy dumps to (or read answers from) the clipboard
    #[arg(long, global = true)]
    pub no_clipboard: bool,

    /// Log every include/exclude decision
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dump project files
    Repo {
        /// Limit the dump to these paths (relative to the current directory);
        /// the whole project when omitted
        paths: Vec<PathBuf>,
    },

    /// Dump files changed in the git working tree
    #[command(group(ArgGroup::new("scope").args(["staged", "unstaged"])))]
    Git {
        /// Only staged changes
        #[arg(long)]
        staged: bool,

        /// Only unstaged changes and untracked files
        #[arg(long)]
        unstaged: bool,
    },

    /// Write the files of an AI answer to disk
    Apply {
        /// Read the answer from a file (`-` for stdin) instead of the clipboard
        #[arg(long, short)]
        file: Option<PathBuf>,

        /// Show what would be written
        #[arg(long)]
        dry_run: bool,
    },

    /// Show recent dumps and optionally restore one
    List {
        #[arg(long, value_enum, default_value_t = Tool::Repo)]
        tool: Tool,

        /// Print as JSON and exit
        #[arg(long)]
        json: bool,
    },

    /// Restore files from a stored dump
    Restore {
        /// Dump number (1 = newest) or file name; newest when omitted
        reference: Option<String>,

        #[arg(long, value_enum, default_value_t = Tool::Repo)]
        tool: Tool,

        /// Show what would be written
        #[arg(long)]
        dry_run: bool,
    },

    /// Create a commented .aidump.toml in the project root
    Init,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Which dump history to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tool {
    Repo,
    Git,
}

impl Tool {
    /// Storage directory name
    pub fn dir_name(self) -> &'static str {
        match self {
            Tool::Repo => "repo",
            Tool::Git => "git",
        }
    }
}
