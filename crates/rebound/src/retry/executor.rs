//! Retry execution engine
//!
//! This module drives the attempt/delay/backoff loop. The loop has exactly two
//! exits, the operation's success value and the operation's last error, and
//! both are taken from inside the loop body.

use std::future::Future;
use std::time::Instant;

use crate::types::{RetryConfig, RetryOptions};

use super::delay::{Delay, JitteredDelay};
use super::observer::{RetryObserver, TracingObserver};
use super::state::{RetryDecision, RetryState};

/// Retry an operation with default options and the default jittered delay
///
/// # Example
///
/// ```rust,no_run
/// async fn example() -> Result<String, std::io::Error> {
///     rebound::retry(|| async {
///         // Your fallible operation here
///         Ok("success".to_string())
///     })
///     .await
/// }
/// ```
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    execute_with_retry(operation, RetryOptions::new(), JitteredDelay::default()).await
}

/// Retry an operation with the given options and the default jittered delay
pub async fn retry_with_options<F, Fut, T, E>(
    operation: F,
    options: RetryOptions<E>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    execute_with_retry(operation, options, JitteredDelay::default()).await
}

/// Retry an operation with the given options and delay
///
/// Unset options take their defaults. On exhaustion the error from the last
/// attempt is returned as-is.
///
/// # Example
///
/// ```rust
/// use rebound::retry::{execute_with_retry, NoDelay};
/// use rebound::RetryOptions;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut calls = 0;
/// let result: Result<u32, &str> = execute_with_retry(
///     || {
///         calls += 1;
///         let attempt = calls;
///         async move { if attempt < 3 { Err("flaky") } else { Ok(attempt) } }
///     },
///     RetryOptions::new().retries(3),
///     NoDelay,
/// )
/// .await;
///
/// assert_eq!(result, Ok(3));
/// # }
/// ```
pub async fn execute_with_retry<F, Fut, T, E, D>(
    operation: F,
    options: RetryOptions<E>,
    delay: D,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    D: Delay,
{
    RetryExecutorBuilder::new()
        .with_options(options)
        .with_delay(delay)
        .build()
        .execute(operation)
        .await
}

/// Builder for configuring a `RetryExecutor`
///
/// # Example
///
/// ```rust
/// use rebound::retry::{JitteredDelay, RetryExecutorBuilder, TracingObserver};
/// use rebound::{BackoffStrategy, RetryOptions};
///
/// let executor = RetryExecutorBuilder::<std::io::Error>::new()
///     .with_options(RetryOptions::new().retries(5).strategy(BackoffStrategy::Fixed))
///     .with_delay(JitteredDelay::new(250))
///     .with_observer(TracingObserver::new("download"))
///     .build();
/// # let _ = executor;
/// ```
pub struct RetryExecutorBuilder<E, D = JitteredDelay, O = TracingObserver> {
    options: RetryOptions<E>,
    delay: D,
    observer: O,
}

impl<E> Default for RetryExecutorBuilder<E, JitteredDelay, TracingObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryExecutorBuilder<E, JitteredDelay, TracingObserver> {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            options: RetryOptions::new(),
            delay: JitteredDelay::default(),
            observer: TracingObserver::default(),
        }
    }
}

impl<E, D, O> RetryExecutorBuilder<E, D, O> {
    /// Layer options over whatever was set before
    pub fn with_options(mut self, options: RetryOptions<E>) -> Self {
        self.options = self.options.merge(options);
        self
    }

    /// Use a fully resolved configuration, replacing earlier options
    pub fn with_config(mut self, config: RetryConfig<E>) -> Self {
        self.options = RetryOptions::from(config);
        self
    }

    /// Set the delay primitive
    pub fn with_delay<D2>(self, delay: D2) -> RetryExecutorBuilder<E, D2, O> {
        RetryExecutorBuilder {
            options: self.options,
            delay,
            observer: self.observer,
        }
    }

    /// Set the observer
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<E, D, O2> {
        RetryExecutorBuilder {
            options: self.options,
            delay: self.delay,
            observer,
        }
    }

    /// Build the executor
    pub fn build(self) -> RetryExecutor<E, D, O> {
        RetryExecutor {
            config: self.options.resolve(),
            delay: self.delay,
            observer: self.observer,
        }
    }
}

/// A retry executor with resolved configuration, delay, and observer
///
/// Use `RetryExecutorBuilder` to create an instance. The executor holds no
/// mutable state, so one instance can run any number of operations, including
/// concurrently.
pub struct RetryExecutor<E, D = JitteredDelay, O = TracingObserver> {
    config: RetryConfig<E>,
    delay: D,
    observer: O,
}

impl<E, D, O> RetryExecutor<E, D, O> {
    /// The resolved configuration
    pub fn config(&self) -> &RetryConfig<E> {
        &self.config
    }
}

impl<E, D, O> RetryExecutor<E, D, O>
where
    D: Delay,
    O: RetryObserver,
{
    /// Execute an operation with retry logic
    ///
    /// # Returns
    ///
    /// The first success value, or the error from the final attempt.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let mut state = RetryState::new(&self.config);

        loop {
            self.observer
                .on_attempt_start(state.attempt(), self.config.retries);

            let err = match operation().await {
                Ok(value) => {
                    self.observer.on_success(state.attempt(), start.elapsed());
                    return Ok(value);
                }
                Err(err) => err,
            };

            let failed_attempt = state.attempt();
            match state.record_failure() {
                RetryDecision::Stop(reason) => {
                    self.observer
                        .on_stopped(state.attempt(), reason, start.elapsed());
                    return Err(err);
                }
                RetryDecision::Retry { delay_ms } => {
                    self.observer.on_attempt_failed(failed_attempt, delay_ms);

                    self.delay.delay(delay_ms).await;
                    state.advance_backoff();

                    if let Some(on_retry) = &self.config.on_retry {
                        on_retry(&err);
                    }
                }
            }
        }
    }
}
