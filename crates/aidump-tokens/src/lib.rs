//! Token counting for dumps
//!
//! Counts are informational only: they are logged after a dump is built so the
//! user knows whether it fits a model's context window.

pub mod estimator;

pub use estimator::{format_tokens, TokenEstimator};
