//! Retry execution engine
//!
//! # Features
//!
//! - Exponential (doubling) or fixed backoff
//! - A delay ceiling that ends retrying even when attempts remain
//! - Injectable delay via the `Delay` trait, jittered by default
//! - Observable retry loop via the `RetryObserver` trait
//! - Builder pattern for flexible executor configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use rebound::retry::execute_with_retry;
//! use rebound::retry::JitteredDelay;
//! use rebound::RetryOptions;
//!
//! async fn example() -> Result<String, std::io::Error> {
//!     let options = RetryOptions::new()
//!         .retries(5)
//!         .on_retry(|err: &std::io::Error| eprintln!("retrying after: {}", err));
//!
//!     execute_with_retry(
//!         || async {
//!             // Your fallible operation here
//!             Ok("success".to_string())
//!         },
//!         options,
//!         JitteredDelay::default(),
//!     )
//!     .await
//! }
//! ```

mod delay;
mod executor;
mod observer;
mod state;

pub use delay::{
    delay_fn, Delay, DelayFn, JitteredDelay, NoDelay, RecordingDelay, DEFAULT_JITTER_MAX_MS,
};
pub use executor::{
    execute_with_retry, retry, retry_with_options, RetryExecutor, RetryExecutorBuilder,
};
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, StopReason, TracingObserver};
pub use state::{RetryDecision, RetryState};
