//! Layered retry options loader
//!
//! Loads `RetryOptions` with the following precedence (low to high):
//! 1. Built-in defaults (applied when the options are resolved)
//! 2. An optional YAML file
//! 3. Environment variables (`REBOUND_*` prefix by default)
//! 4. Options set in code (merged by the caller with `RetryOptions::merge`)

use std::env;
use std::fs;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{Error, Result};
use crate::types::RetryOptions;

/// Default prefix for environment overrides
pub const DEFAULT_ENV_PREFIX: &str = "REBOUND";

/// Loads retry options from a file and the environment
///
/// # Example
///
/// ```rust,no_run
/// use rebound::OptionsLoader;
///
/// let options = OptionsLoader::new()
///     .with_file("config/retry.yaml")
///     .load::<std::io::Error>()?;
/// # Ok::<(), rebound::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct OptionsLoader {
    file: Option<Utf8PathBuf>,
    env_prefix: String,
}

impl Default for OptionsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsLoader {
    /// Create a loader that only reads `REBOUND_*` variables
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Read options from a YAML file; the file must exist
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// The configured file, if any
    pub fn file(&self) -> Option<&Utf8Path> {
        self.file.as_deref()
    }

    /// Load options from every configured source
    pub fn load<E>(&self) -> Result<RetryOptions<E>> {
        let mut options = RetryOptions::new();

        if let Some(path) = &self.file {
            let file_options = Self::load_yaml_file(path)?;
            options = options.merge(file_options);
        }

        let env_options = self.load_env()?;
        Ok(options.merge(env_options))
    }

    /// Parse a YAML options file
    fn load_yaml_file<E>(path: &Utf8Path) -> Result<RetryOptions<E>> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        tracing::debug!(path = %path, "loading retry options");

        RetryOptions::from_yaml_str(&content).inspect_err(|e| {
            tracing::warn!(path = %path, error = %e, "failed to parse retry options");
        })
    }

    /// Collect options from environment variables
    fn load_env<E>(&self) -> Result<RetryOptions<E>> {
        Ok(RetryOptions {
            retries: self.env_value("RETRIES")?,
            strategy: self.env_value("STRATEGY")?,
            base_timeout_ms: self.env_value("BASE_TIMEOUT_MS")?,
            max_timeout_ms: self.env_value("MAX_TIMEOUT_MS")?,
            on_retry: None,
        })
    }

    fn env_value<T: FromStr>(&self, suffix: &str) -> Result<Option<T>> {
        let name = format!("{}_{}", self.env_prefix, suffix);
        match env::var(&name) {
            Ok(val) => val
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Error::invalid_config(format!("{} has an invalid value: {}", name, val))),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BackoffStrategy;
    use serial_test::serial;
    use tempfile::TempDir;

    fn write_options(content: &str) -> (Utf8PathBuf, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join("retry.yaml"))
            .expect("Invalid UTF-8 path");
        fs::write(&path, content).unwrap();
        (path, temp_dir)
    }

    #[test]
    #[serial]
    fn test_load_nothing_configured() {
        let options = OptionsLoader::new()
            .with_env_prefix("REBOUND_TEST_EMPTY")
            .load::<()>()
            .unwrap();

        assert!(options.retries.is_none());
        assert!(options.strategy.is_none());
        assert_eq!(options.resolve().retries, 3);
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let (path, _temp) = write_options(
            r#"
retries: 6
strategy: fixed
max-timeout-ms: 60000
"#,
        );

        let options = OptionsLoader::new()
            .with_file(path)
            .with_env_prefix("REBOUND_TEST_FILE")
            .load::<()>()
            .unwrap();

        assert_eq!(options.retries, Some(6));
        assert_eq!(options.strategy, Some(BackoffStrategy::Fixed));
        assert_eq!(options.max_timeout_ms, Some(60000));
        assert_eq!(options.base_timeout_ms, None);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let (path, _temp) = write_options("retries: 6\nbase-timeout-ms: 100\n");

        env::set_var("REBOUND_TEST_ENV_RETRIES", "9");
        env::set_var("REBOUND_TEST_ENV_STRATEGY", "FIXED");

        let options = OptionsLoader::new()
            .with_file(path)
            .with_env_prefix("REBOUND_TEST_ENV")
            .load::<()>()
            .unwrap();

        env::remove_var("REBOUND_TEST_ENV_RETRIES");
        env::remove_var("REBOUND_TEST_ENV_STRATEGY");

        assert_eq!(options.retries, Some(9));
        assert_eq!(options.strategy, Some(BackoffStrategy::Fixed));
        assert_eq!(options.base_timeout_ms, Some(100));
    }

    #[test]
    #[serial]
    fn test_invalid_env_value() {
        env::set_var("REBOUND_TEST_BAD_MAX_TIMEOUT_MS", "soon");

        let result = OptionsLoader::new()
            .with_env_prefix("REBOUND_TEST_BAD")
            .load::<()>();

        env::remove_var("REBOUND_TEST_BAD_MAX_TIMEOUT_MS");

        match result {
            Err(Error::InvalidConfig { message }) => {
                assert!(message.contains("REBOUND_TEST_BAD_MAX_TIMEOUT_MS"));
            }
            other => panic!("expected invalid config, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = OptionsLoader::new()
            .with_file("/nonexistent/rebound/retry.yaml")
            .with_env_prefix("REBOUND_TEST_MISSING")
            .load::<()>();

        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let (path, _temp) = write_options("retries: [not, a, number]\n");

        let result = OptionsLoader::new()
            .with_file(path)
            .with_env_prefix("REBOUND_TEST_MALFORMED")
            .load::<()>();

        assert!(matches!(result, Err(Error::YamlParse(_))));
    }

    #[test]
    fn test_file_and_inline_parse_errors_match() {
        let content = "strategy: [fixed]\n";
        let (path, _temp) = write_options(content);

        let from_file = OptionsLoader::new()
            .with_file(path)
            .with_env_prefix("REBOUND_TEST_PARSE_MATCH")
            .load::<()>();
        let inline = RetryOptions::<()>::from_yaml_str(content);

        assert!(matches!(from_file, Err(Error::YamlParse(_))));
        assert!(matches!(inline, Err(Error::YamlParse(_))));
    }

    #[test]
    fn test_file_accessor() {
        assert_eq!(OptionsLoader::new().file(), None);

        let loader = OptionsLoader::new().with_file("/etc/rebound.yaml");
        assert_eq!(loader.file(), Some(Utf8Path::new("/etc/rebound.yaml")));
    }
}
