//! Env-file secret redaction
//!
//! Values from the project's env files are collected once per run and masked
//! wherever they appear verbatim in dumped content.

pub mod env;
pub mod redactor;

pub use env::{parse_env_file, parse_env_values};
pub use redactor::{collect_secrets, redact, SecretSet, DEFAULT_ENV_FILES, MASK};
