use thiserror::Error;

use crate::resolver::ConflictReport;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration: {}", describe_conflicts(.0))]
    ConfigurationConflict(Vec<ConflictReport>),

    #[error("Malformed rule '{rule}': {reason}")]
    MalformedRule { rule: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

fn describe_conflicts(conflicts: &[ConflictReport]) -> String {
    let listed: Vec<String> = conflicts.iter().map(|c| c.to_string()).collect();
    format!(
        "paths present in both blacklisted_paths and whitelisted_paths: {}. Remove the duplicates from the configuration file",
        listed.join("; ")
    )
}
