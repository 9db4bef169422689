//! # rebound
//!
//! Retry wrapper for asynchronous operations:
//! - Exponential or fixed backoff with a delay ceiling
//! - Jittered default delay, replaceable for tests
//! - Optional per-retry callback and observer hook
//! - Options loading from YAML files and environment variables
//!
//! The final error of a failing operation is returned exactly as the operation
//! produced it.
//!
//! `execute_with_retry` and the other retry functions never read environment
//! variables or files. Only `OptionsLoader` does, and only when the caller
//! uses it.

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::OptionsLoader;
pub use error::{Error, Result};
pub use retry::{execute_with_retry, retry, retry_with_options};
pub use types::{BackoffStrategy, OnRetry, RetryConfig, RetryOptions};
