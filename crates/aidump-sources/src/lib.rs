//! Candidate file sources for dumps

pub mod binary;
pub mod git;
pub mod handler;
pub mod repo;

pub use binary::is_binary;
pub use git::{find_git_root, ChangeScope, GitChangesSource};
pub use handler::{Candidate, CandidateSource};
pub use repo::RepoSource;
