//! Storage layer for aidump
//!
//! Every dump is also written to a per-project directory under the system
//! temp dir, so earlier dumps can be listed and restored later.

pub mod error;
pub mod store;

pub use error::{Result, StorageError};
pub use store::{format_size, DumpEntry, DumpStore};
