//! Retry configuration types
//!
//! `RetryOptions` is the partial, user-facing form: every field may be left
//! unset and falls back to its default. `RetryConfig` is the resolved form the
//! executor runs with.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Callback invoked with the error of a failed attempt that will be retried
pub type OnRetry<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// How the delay evolves between retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Double the delay after every retry (default)
    #[default]
    Exponential,

    /// Keep the delay at the base timeout
    Fixed,
}

impl BackoffStrategy {
    /// The configuration name of this strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            BackoffStrategy::Exponential => "exponential",
            BackoffStrategy::Fixed => "fixed",
        }
    }
}

impl fmt::Display for BackoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackoffStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exponential" => Ok(BackoffStrategy::Exponential),
            "fixed" => Ok(BackoffStrategy::Fixed),
            other => Err(Error::invalid_config(format!(
                "unknown backoff strategy '{}', expected 'exponential' or 'fixed'",
                other
            ))),
        }
    }
}

pub(crate) const DEFAULT_RETRIES: u32 = 3;
pub(crate) const DEFAULT_BASE_TIMEOUT_MS: u64 = 1000;
pub(crate) const DEFAULT_MAX_TIMEOUT_MS: u64 = 5 * 60 * 1000;

/// Fully resolved retry configuration
pub struct RetryConfig<E> {
    /// Total number of attempts, the initial one included
    pub retries: u32,

    /// Backoff strategy
    pub strategy: BackoffStrategy,

    /// Delay before the first retry, in milliseconds
    pub base_timeout_ms: u64,

    /// Once the current delay reaches this value, retrying stops
    pub max_timeout_ms: u64,

    /// Invoked once per retry with the error that caused it
    pub on_retry: Option<OnRetry<E>>,
}

impl<E> Default for RetryConfig<E> {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            strategy: BackoffStrategy::default(),
            base_timeout_ms: DEFAULT_BASE_TIMEOUT_MS,
            max_timeout_ms: DEFAULT_MAX_TIMEOUT_MS,
            on_retry: None,
        }
    }
}

impl<E> Clone for RetryConfig<E> {
    fn clone(&self) -> Self {
        Self {
            retries: self.retries,
            strategy: self.strategy,
            base_timeout_ms: self.base_timeout_ms,
            max_timeout_ms: self.max_timeout_ms,
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("retries", &self.retries)
            .field("strategy", &self.strategy)
            .field("base_timeout_ms", &self.base_timeout_ms)
            .field("max_timeout_ms", &self.max_timeout_ms)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

/// Partial retry configuration
///
/// Any field left as `None` takes its default when resolved. The callback is
/// never read from or written to configuration files.
///
/// # Example
///
/// ```rust
/// use rebound::{BackoffStrategy, RetryOptions};
///
/// let config = RetryOptions::<std::io::Error>::new()
///     .retries(5)
///     .strategy(BackoffStrategy::Fixed)
///     .resolve();
///
/// assert_eq!(config.retries, 5);
/// assert_eq!(config.base_timeout_ms, 1000);
/// ```
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", bound = "")]
pub struct RetryOptions<E> {
    /// Total number of attempts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,

    /// Backoff strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<BackoffStrategy>,

    /// Delay before the first retry, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_timeout_ms: Option<u64>,

    /// Delay ceiling, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_timeout_ms: Option<u64>,

    /// Retry callback
    #[serde(skip)]
    pub on_retry: Option<OnRetry<E>>,
}

impl<E> RetryOptions<E> {
    /// Create options with every field unset
    pub fn new() -> Self {
        Self {
            retries: None,
            strategy: None,
            base_timeout_ms: None,
            max_timeout_ms: None,
            on_retry: None,
        }
    }

    /// Set the total number of attempts
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Set the backoff strategy
    pub fn strategy(mut self, strategy: BackoffStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Set the delay before the first retry
    pub fn base_timeout_ms(mut self, millis: u64) -> Self {
        self.base_timeout_ms = Some(millis);
        self
    }

    /// Set the delay ceiling
    pub fn max_timeout_ms(mut self, millis: u64) -> Self {
        self.max_timeout_ms = Some(millis);
        self
    }

    /// Set the retry callback
    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(callback));
        self
    }

    /// Layer `overlay` on top of these options
    ///
    /// Fields set in `overlay` win; unset fields keep the value from `self`.
    pub fn merge(self, overlay: RetryOptions<E>) -> Self {
        Self {
            retries: overlay.retries.or(self.retries),
            strategy: overlay.strategy.or(self.strategy),
            base_timeout_ms: overlay.base_timeout_ms.or(self.base_timeout_ms),
            max_timeout_ms: overlay.max_timeout_ms.or(self.max_timeout_ms),
            on_retry: overlay.on_retry.or(self.on_retry),
        }
    }

    /// Fill unset fields with defaults
    ///
    /// A `retries` of 0 is raised to 1 so the operation always runs once.
    pub fn resolve(self) -> RetryConfig<E> {
        let defaults = RetryConfig::<E>::default();

        let retries = match self.retries {
            Some(0) => {
                tracing::warn!(retries = 0, "retries must be at least 1, using 1");
                1
            }
            Some(n) => n,
            None => defaults.retries,
        };

        RetryConfig {
            retries,
            strategy: self.strategy.unwrap_or(defaults.strategy),
            base_timeout_ms: self.base_timeout_ms.unwrap_or(defaults.base_timeout_ms),
            max_timeout_ms: self.max_timeout_ms.unwrap_or(defaults.max_timeout_ms),
            on_retry: self.on_retry,
        }
    }

    /// Parse options from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(content)?)
    }
}

impl<E> Default for RetryOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for RetryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            retries: self.retries,
            strategy: self.strategy,
            base_timeout_ms: self.base_timeout_ms,
            max_timeout_ms: self.max_timeout_ms,
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("retries", &self.retries)
            .field("strategy", &self.strategy)
            .field("base_timeout_ms", &self.base_timeout_ms)
            .field("max_timeout_ms", &self.max_timeout_ms)
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl<E> From<RetryConfig<E>> for RetryOptions<E> {
    fn from(config: RetryConfig<E>) -> Self {
        Self {
            retries: Some(config.retries),
            strategy: Some(config.strategy),
            base_timeout_ms: Some(config.base_timeout_ms),
            max_timeout_ms: Some(config.max_timeout_ms),
            on_retry: config.on_retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    type Opts = RetryOptions<String>;

    #[test]
    fn test_defaults() {
        let config = Opts::new().resolve();
        assert_eq!(config.retries, 3);
        assert_eq!(config.strategy, BackoffStrategy::Exponential);
        assert_eq!(config.base_timeout_ms, 1000);
        assert_eq!(config.max_timeout_ms, 300_000);
        assert!(config.on_retry.is_none());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = Opts::new().max_timeout_ms(8000).resolve();
        assert_eq!(config.max_timeout_ms, 8000);
        assert_eq!(config.retries, 3);
        assert_eq!(config.base_timeout_ms, 1000);
    }

    #[test]
    fn test_zero_retries_clamped_to_one() {
        let config = Opts::new().retries(0).resolve();
        assert_eq!(config.retries, 1);
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = Opts::new().retries(5).base_timeout_ms(200);
        let overlay = Opts::new().retries(7).strategy(BackoffStrategy::Fixed);

        let merged = base.merge(overlay);
        assert_eq!(merged.retries, Some(7));
        assert_eq!(merged.strategy, Some(BackoffStrategy::Fixed));
        assert_eq!(merged.base_timeout_ms, Some(200));
        assert_eq!(merged.max_timeout_ms, None);
    }

    #[test]
    fn test_merge_keeps_callback_when_overlay_has_none() {
        let hits = Arc::new(AtomicU32::new(0));
        let counter = hits.clone();
        let base = Opts::new().on_retry(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let merged = base.merge(Opts::new().retries(2));
        let callback = merged.on_retry.expect("callback kept");
        callback(&"boom".to_string());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "exponential".parse::<BackoffStrategy>().unwrap(),
            BackoffStrategy::Exponential
        );
        assert_eq!(
            " Fixed ".parse::<BackoffStrategy>().unwrap(),
            BackoffStrategy::Fixed
        );
        assert!("linear".parse::<BackoffStrategy>().is_err());
    }

    #[test]
    fn test_yaml_parsing() {
        let opts = Opts::from_yaml_str(
            r#"
retries: 50
strategy: fixed
base-timeout-ms: 250
"#,
        )
        .unwrap();

        assert_eq!(opts.retries, Some(50));
        assert_eq!(opts.strategy, Some(BackoffStrategy::Fixed));
        assert_eq!(opts.base_timeout_ms, Some(250));
        assert_eq!(opts.max_timeout_ms, None);
    }

    #[test]
    fn test_yaml_rejects_unknown_strategy() {
        let result = Opts::from_yaml_str("strategy: linear\n");
        assert!(matches!(result, Err(Error::YamlParse(_))));
    }

    #[test]
    fn test_serialize_skips_unset_fields() {
        let yaml = serde_yaml_ng::to_string(&Opts::new().retries(4)).unwrap();
        assert_eq!(yaml.trim(), "retries: 4");
    }

    #[test]
    fn test_debug_hides_callback() {
        let opts = Opts::new().on_retry(|_| {});
        let debug = format!("{:?}", opts);
        assert!(debug.contains("<callback>"));
    }
}
