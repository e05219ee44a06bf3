//! Picker Configuration
//!
//! `TigerStyle`: Sensible defaults, builder pattern, explicit over implicit.

use chrono::Duration;
use thiserror::Error;

use crate::constants::{
    MATCHUP_SIZE_COUNT_DEFAULT, MATCHUP_SIZE_COUNT_MAX, MATCHUP_SIZE_COUNT_MIN,
    SELECTION_COOLDOWN_DAYS_DEFAULT, SELECTION_COOLDOWN_DAYS_MAX, STATS_POPULAR_COUNT_DEFAULT,
    STATS_POPULAR_COUNT_MAX,
};

/// Cooldown in days.
pub const ENV_COOLDOWN_DAYS: &str = "PICKME_COOLDOWN_DAYS";
/// Candidates per matchup.
pub const ENV_MATCHUP_SIZE: &str = "PICKME_MATCHUP_SIZE";
/// Popular items to report.
pub const ENV_POPULAR_LIMIT: &str = "PICKME_POPULAR_LIMIT";
/// PostgreSQL connection URL.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

// =============================================================================
// ConfigError
// =============================================================================

/// Invalid configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable is not a number
    #[error("{var}={value:?} is not a valid number")]
    NotANumber {
        /// Variable name
        var: String,
        /// Raw value
        value: String,
    },

    /// Value outside its allowed range
    #[error("{field} = {value} outside {min}..={max}")]
    OutOfRange {
        /// Setting name
        field: &'static str,
        /// Rejected value
        value: i64,
        /// Smallest allowed
        min: i64,
        /// Largest allowed
        max: i64,
    },

    /// Database URL is not a postgres URL
    #[error("database url must start with postgres:// or postgresql://")]
    InvalidDatabaseUrl,
}

// =============================================================================
// PickerConfig
// =============================================================================

/// Settings for a [`Picker`](super::Picker).
///
/// `TigerStyle`:
/// - Sensible defaults via Default impl
/// - Builder pattern for customization
/// - All fields public for transparency
///
/// # Example
///
/// ```rust
/// use chrono::Duration;
/// use pickme_core::picker::PickerConfig;
///
/// let config = PickerConfig::default()
///     .with_cooldown(Duration::days(14))
///     .with_matchup_size(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PickerConfig {
    /// How long a selected item stays ineligible.
    ///
    /// Default: 7 days
    pub cooldown: Duration,

    /// Candidates per matchup.
    ///
    /// Default: 5
    pub matchup_size: usize,

    /// Items reported by `popular_items`.
    ///
    /// Default: 10
    pub popular_limit: usize,

    /// PostgreSQL connection URL, if persistent storage is used.
    ///
    /// Default: None
    pub database_url: Option<String>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::days(SELECTION_COOLDOWN_DAYS_DEFAULT as i64),
            matchup_size: MATCHUP_SIZE_COUNT_DEFAULT,
            popular_limit: STATS_POPULAR_COUNT_DEFAULT,
            database_url: None,
        }
    }
}

impl PickerConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `PICKME_*` and `DATABASE_URL` variables.
    ///
    /// # Errors
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let parse = |var: &str| -> Result<Option<u64>, ConfigError> {
            match lookup(var) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| ConfigError::NotANumber {
                        var: var.to_string(),
                        value,
                    }),
                None => Ok(None),
            }
        };

        let mut config = Self::default();
        if let Some(days) = parse(ENV_COOLDOWN_DAYS)? {
            let days = i64::try_from(days).unwrap_or(i64::MAX);
            config.cooldown = Duration::try_days(days).unwrap_or(Duration::MAX);
        }
        if let Some(size) = parse(ENV_MATCHUP_SIZE)? {
            config.matchup_size = usize::try_from(size).unwrap_or(usize::MAX);
        }
        if let Some(limit) = parse(ENV_POPULAR_LIMIT)? {
            config.popular_limit = usize::try_from(limit).unwrap_or(usize::MAX);
        }
        config.database_url = lookup(ENV_DATABASE_URL).filter(|url| !url.trim().is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Set the cooldown window.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set candidates per matchup.
    #[must_use]
    pub fn with_matchup_size(mut self, size: usize) -> Self {
        self.matchup_size = size;
        self
    }

    /// Set the popular items limit.
    #[must_use]
    pub fn with_popular_limit(mut self, limit: usize) -> Self {
        self.popular_limit = limit;
        self
    }

    /// Set the database URL.
    #[must_use]
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Check every setting against its range.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cooldown_max = Duration::days(SELECTION_COOLDOWN_DAYS_MAX as i64);
        if self.cooldown < Duration::zero() || self.cooldown > cooldown_max {
            return Err(ConfigError::OutOfRange {
                field: "cooldown_days",
                value: self.cooldown.num_days(),
                min: 0,
                max: SELECTION_COOLDOWN_DAYS_MAX as i64,
            });
        }

        if !(MATCHUP_SIZE_COUNT_MIN..=MATCHUP_SIZE_COUNT_MAX).contains(&self.matchup_size) {
            return Err(ConfigError::OutOfRange {
                field: "matchup_size",
                value: i64::try_from(self.matchup_size).unwrap_or(i64::MAX),
                min: MATCHUP_SIZE_COUNT_MIN as i64,
                max: MATCHUP_SIZE_COUNT_MAX as i64,
            });
        }

        if !(1..=STATS_POPULAR_COUNT_MAX).contains(&self.popular_limit) {
            return Err(ConfigError::OutOfRange {
                field: "popular_limit",
                value: i64::try_from(self.popular_limit).unwrap_or(i64::MAX),
                min: 1,
                max: STATS_POPULAR_COUNT_MAX as i64,
            });
        }

        if let Some(url) = &self.database_url {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(ConfigError::InvalidDatabaseUrl);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PickerConfig::default();

        assert_eq!(config.cooldown, Duration::days(7));
        assert_eq!(config.matchup_size, 5);
        assert_eq!(config.popular_limit, 10);
        assert!(config.database_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = PickerConfig::new()
            .with_cooldown(Duration::days(30))
            .with_matchup_size(3)
            .with_popular_limit(5)
            .with_database_url("postgres://localhost/pickme");

        assert_eq!(config.cooldown, Duration::days(30));
        assert_eq!(config.matchup_size, 3);
        assert_eq!(config.popular_limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = PickerConfig::from_lookup(lookup(&[
            (ENV_COOLDOWN_DAYS, "3"),
            (ENV_MATCHUP_SIZE, " 4 "),
            (ENV_DATABASE_URL, "postgresql://db/pickme"),
        ]))
        .unwrap();

        assert_eq!(config.cooldown, Duration::days(3));
        assert_eq!(config.matchup_size, 4);
        assert_eq!(config.popular_limit, 10);
        assert_eq!(config.database_url.as_deref(), Some("postgresql://db/pickme"));
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = PickerConfig::from_lookup(lookup(&[(ENV_MATCHUP_SIZE, "five")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotANumber {
                var: ENV_MATCHUP_SIZE.to_string(),
                value: "five".to_string()
            }
        );

        let err = PickerConfig::from_lookup(lookup(&[(ENV_MATCHUP_SIZE, "40")])).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "matchup_size", .. }));
    }

    #[test]
    fn test_validate_ranges() {
        assert!(PickerConfig::new()
            .with_cooldown(Duration::days(-1))
            .validate()
            .is_err());
        assert!(PickerConfig::new()
            .with_cooldown(Duration::zero())
            .validate()
            .is_ok());
        assert!(PickerConfig::new().with_matchup_size(1).validate().is_err());
        assert!(PickerConfig::new().with_popular_limit(0).validate().is_err());
        assert_eq!(
            PickerConfig::new()
                .with_database_url("mysql://db")
                .validate(),
            Err(ConfigError::InvalidDatabaseUrl)
        );
    }
}
