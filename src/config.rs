use once_cell::sync::Lazy;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

static GLOBAL_CONFIG: Lazy<Mutex<Option<Config>>> = Lazy::new(|| Mutex::new(None));

/// Configuring the b58id library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) cache_capacity: Option<usize>,
    pub(crate) lenient_fallback: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cache capacity must be at least 1")]
    InvalidCacheCapacity,
}

impl Config {
    /// Creates a new configuration with default settings.
    /// - the decode cache is unbounded, so every distinct identifier decoded by the
    ///   process stays memoized.  Long running services exposed to arbitrary input
    ///   will want to set `cache_capacity`.
    /// - `lenient_fallback` is on: text that is not a base58 identifier but reads as a
    ///   bare integer decodes to that integer.
    pub fn new() -> Self {
        Config {
            cache_capacity: None,
            lenient_fallback: true,
        }
    }

    /// Limits the number of memoized decodes.  The value must be at least 1.
    pub fn cache_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            Err(ConfigError::InvalidCacheCapacity)
        } else {
            self.cache_capacity = Some(capacity);
            Ok(self)
        }
    }

    /// Enables or disables decoding bare numerals that are not base58 identifiers.
    pub fn lenient_fallback(mut self, enabled: bool) -> Self {
        self.lenient_fallback = enabled;
        self
    }

    /// Sets the global configuration.  This must be called before the crate level
    /// functions or the `Field` type are first used to have any effect.
    pub fn set_global(config: Config) {
        let mut global_config = GLOBAL_CONFIG
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *global_config = Some(config);
    }

    /// Accesses the global configuration, if set.
    pub fn global() -> Option<Config> {
        GLOBAL_CONFIG
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache_capacity, None);
        assert!(config.lenient_fallback);
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .cache_capacity(128)
            .unwrap()
            .lenient_fallback(false);
        assert_eq!(config.cache_capacity, Some(128));
        assert!(!config.lenient_fallback);
    }

    #[test]
    fn test_global() {
        // Other tests rely on the global codec using default settings.
        Config::set_global(Config::new());
        assert_eq!(Config::global(), Some(Config::new()));
    }

    #[test]
    fn test_invalid_capacity() {
        assert_eq!(
            Config::new().cache_capacity(0),
            Err(ConfigError::InvalidCacheCapacity)
        );
    }
}
