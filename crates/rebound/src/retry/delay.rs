//! Delay primitives
//!
//! The executor suspends between attempts only through the [`Delay`] trait.
//! [`JitteredDelay`] is the production default; [`NoDelay`] and
//! [`RecordingDelay`] make retry loops run instantly in tests.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{self, BoxFuture};
use rand::Rng;

/// Default upper bound (exclusive) of the random jitter, in milliseconds
pub const DEFAULT_JITTER_MAX_MS: u64 = 1000;

/// A timed suspension between retry attempts
///
/// # Example
///
/// ```rust
/// use futures::future::BoxFuture;
/// use rebound::retry::Delay;
///
/// struct Halved;
///
/// impl Delay for Halved {
///     fn delay(&self, millis: u64) -> BoxFuture<'_, ()> {
///         Box::pin(tokio::time::sleep(std::time::Duration::from_millis(millis / 2)))
///     }
/// }
/// ```
pub trait Delay: Send + Sync {
    /// Suspend for roughly `millis` milliseconds
    fn delay(&self, millis: u64) -> BoxFuture<'_, ()>;
}

/// Sleeps for the requested time plus a uniform random jitter
///
/// The jitter is drawn from `[0, jitter_max_ms)` so that many callers failing
/// at the same moment do not retry in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitteredDelay {
    jitter_max_ms: u64,
}

impl JitteredDelay {
    /// Create a delay with a custom jitter bound; 0 disables jitter
    pub fn new(jitter_max_ms: u64) -> Self {
        Self { jitter_max_ms }
    }

    /// Exclusive upper bound of the jitter
    pub fn jitter_max_ms(&self) -> u64 {
        self.jitter_max_ms
    }

    /// The total sleep for a requested delay, jitter included
    pub fn jittered_millis(&self, millis: u64) -> u64 {
        if self.jitter_max_ms == 0 {
            return millis;
        }
        let jitter = rand::rng().random_range(0..self.jitter_max_ms);
        millis.saturating_add(jitter)
    }
}

impl Default for JitteredDelay {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER_MAX_MS)
    }
}

impl Delay for JitteredDelay {
    fn delay(&self, millis: u64) -> BoxFuture<'_, ()> {
        let total = self.jittered_millis(millis);
        Box::pin(tokio::time::sleep(Duration::from_millis(total)))
    }
}

/// Resolves immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay(&self, _millis: u64) -> BoxFuture<'_, ()> {
        Box::pin(future::ready(()))
    }
}

/// Resolves immediately and remembers every requested delay
///
/// Useful for testing and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    calls: Mutex<Vec<u64>>,
}

impl RecordingDelay {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested delays, in call order
    pub fn calls(&self) -> Vec<u64> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of delays requested so far
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Delay for RecordingDelay {
    fn delay(&self, millis: u64) -> BoxFuture<'_, ()> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(millis);
        Box::pin(future::ready(()))
    }
}

/// Adapts a closure returning a future into a [`Delay`]
#[derive(Debug, Clone, Copy)]
pub struct DelayFn<F>(F);

/// Wrap `f` as a [`Delay`]
///
/// ```rust
/// use rebound::retry::delay_fn;
///
/// let delay = delay_fn(|millis| async move {
///     tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
/// });
/// # let _ = delay;
/// ```
pub fn delay_fn<F, Fut>(f: F) -> DelayFn<F>
where
    F: Fn(u64) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    DelayFn(f)
}

impl<F, Fut> Delay for DelayFn<F>
where
    F: Fn(u64) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn delay(&self, millis: u64) -> BoxFuture<'_, ()> {
        Box::pin((self.0)(millis))
    }
}

impl<T: Delay + ?Sized> Delay for Arc<T> {
    fn delay(&self, millis: u64) -> BoxFuture<'_, ()> {
        (**self).delay(millis)
    }
}

impl<T: Delay + ?Sized> Delay for Box<T> {
    fn delay(&self, millis: u64) -> BoxFuture<'_, ()> {
        (**self).delay(millis)
    }
}

impl<T: Delay + ?Sized> Delay for &T {
    fn delay(&self, millis: u64) -> BoxFuture<'_, ()> {
        (**self).delay(millis)
    }
}
