//! Dump orchestration for aidump
//!
//! `Dumper` turns a candidate source into dump text: rules, `.gitignore`,
//! binary detection and secret masking are applied here. `restore` and
//! `apply` write dumps and AI responses back onto disk.

pub mod dumper;
pub mod writer;

pub use dumper::{DumpReport, Dumper};
pub use writer::{apply, restore, WriteMode, WriteOutcome, WriteStatus};
