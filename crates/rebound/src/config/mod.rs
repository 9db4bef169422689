//! Retry options loading

mod loader;

pub use loader::{OptionsLoader, DEFAULT_ENV_PREFIX};
