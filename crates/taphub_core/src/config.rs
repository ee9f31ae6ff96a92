//! Watcher configuration.
//!
//! # Responsibility
//! - Load the polling interval, noise markers and notification targets from
//!   a JSON file.
//! - Reject configurations the poll cycle cannot run with.
//!
//! # Invariants
//! - `poll_interval_secs` is greater than zero.
//! - Noise markers are non-blank; a blank marker would match every name.

use crate::reconcile::Normalizer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Interval used when the config file does not set one.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5 * 60;

/// Errors from loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// Runtime configuration for the roster watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Seconds to sleep between two cycles.
    pub poll_interval_secs: u64,
    /// Case-sensitive markers of placeholder/non-product item names.
    pub noise_substrings: Vec<String>,
    /// Location names whose changes are sent to the notification sink.
    pub notify_locations: Vec<String>,
    /// Prefix joined with one space in front of feed location names.
    pub location_prefix: Option<String>,
    /// Title-case feed location names before prefixing.
    pub title_case_locations: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            noise_substrings: Vec::new(),
            notify_locations: Vec::new(),
            location_prefix: None,
            title_case_locations: false,
        }
    }
}

impl WatchConfig {
    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks declaration-level invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(index) = self
            .noise_substrings
            .iter()
            .position(|marker| marker.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "noise_substrings[{index}] must not be blank"
            )));
        }
        if let Some(index) = self
            .notify_locations
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "notify_locations[{index}] must not be blank"
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.noise_substrings.iter().cloned())
    }

    pub fn notify_policy(&self) -> NotifyPolicy {
        NotifyPolicy::new(self.notify_locations.iter().cloned())
    }
}

/// Decides which locations may emit notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyPolicy {
    locations: BTreeSet<String>,
}

impl NotifyPolicy {
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locations: locations.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive match on the location name.
    pub fn is_enabled(&self, location_name: &str) -> bool {
        self.locations.contains(location_name)
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WatchConfig, DEFAULT_POLL_INTERVAL_SECS};
    use std::time::Duration;

    #[test]
    fn empty_object_uses_defaults() {
        let config: WatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WatchConfig::default());
        assert_eq!(
            config.poll_interval(),
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
        );
        assert!(config.validate().is_ok());
        assert!(config.notify_policy().is_empty());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = WatchConfig {
            poll_interval_secs: 0,
            ..WatchConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(message) if message.contains("poll_interval_secs")
        ));
    }

    #[test]
    fn blank_noise_marker_is_rejected_with_index() {
        let config = WatchConfig {
            noise_substrings: vec!["DRAFT".to_string(), " ".to_string()],
            ..WatchConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("noise_substrings[1]"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_json::from_str::<WatchConfig>(r#"{"poll_interval": 10}"#);
        assert!(result.is_err());
    }

    #[test]
    fn notify_policy_matches_exact_names() {
        let config = WatchConfig {
            notify_locations: vec!["BrewDog EDINBURGH".to_string()],
            ..WatchConfig::default()
        };
        let policy = config.notify_policy();
        assert!(policy.is_enabled("BrewDog EDINBURGH"));
        assert!(!policy.is_enabled("BrewDog Edinburgh"));
        assert!(!policy.is_enabled("BrewDog Camden"));
    }
}
