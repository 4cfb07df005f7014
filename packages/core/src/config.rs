//! Registry Configuration
//!
//! Storage root and engine bounds for an [`IssuerRegistry`](crate::IssuerRegistry).

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{IssuerError, Result};

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "CERTEASY_DATA_DIR";
/// Environment variable holding the generation timeout in whole seconds
pub const GENERATION_TIMEOUT_ENV: &str = "CERTEASY_GENERATION_TIMEOUT_SECS";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_GENERATION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Directory holding one subdirectory per issuer
    pub data_dir: PathBuf,
    /// Upper bound on a single certificate generation call
    pub generation_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

impl RegistryConfig {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Defaults overridden by `CERTEASY_DATA_DIR` and
    /// `CERTEASY_GENERATION_TIMEOUT_SECS`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the timeout variable is not a
    /// whole number of seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(GENERATION_TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                IssuerError::InvalidConfiguration(format!(
                    "{GENERATION_TIMEOUT_ENV} must be a whole number of seconds, got {secs:?}"
                ))
            })?;
            config.generation_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if:
    /// - `data_dir` is empty, missing or not a directory
    /// - `generation_timeout` is zero or exceeds 1 hour
    pub fn validate(&self) -> Result<()> {
        if self.generation_timeout.is_zero() {
            return Err(IssuerError::InvalidConfiguration(
                "generation timeout cannot be zero".to_string(),
            ));
        }
        if self.generation_timeout > MAX_GENERATION_TIMEOUT {
            return Err(IssuerError::InvalidConfiguration(
                "generation timeout cannot exceed 1 hour".to_string(),
            ));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(IssuerError::InvalidConfiguration(
                "data directory path cannot be empty".to_string(),
            ));
        }
        if !self.data_dir.is_dir() {
            return Err(IssuerError::InvalidConfiguration(format!(
                "data directory must point to an existing directory: {}",
                self.data_dir.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_defaults() {
        let config = RegistryConfig::from_lookup(|key| match key {
            DATA_DIR_ENV => Some("/srv/certeasy".to_string()),
            GENERATION_TIMEOUT_ENV => Some(" 5 ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/certeasy"));
        assert_eq!(config.generation_timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_env_keeps_defaults() {
        let config = RegistryConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = RegistryConfig::from_lookup(|key| {
            (key == GENERATION_TIMEOUT_ENV).then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, IssuerError::InvalidConfiguration(_)));
    }

    #[test]
    fn validate_checks_directory_and_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegistryConfig::new(dir.path());
        assert!(config.validate().is_ok());

        let zero = config.clone().with_generation_timeout(Duration::ZERO);
        assert!(zero.validate().is_err());

        let missing = RegistryConfig::new(dir.path().join("nope"));
        assert!(matches!(
            missing.validate(),
            Err(IssuerError::InvalidConfiguration(_))
        ));
    }
}
