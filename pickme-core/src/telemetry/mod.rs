//! Logging Setup
//!
//! `TigerStyle`: Opt-in, validated, never panics. The library only emits
//! `tracing` events; binaries and tests call [`init_logging`] once if they
//! want them printed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pickme_core::telemetry::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::builder()
//!     .filter("pickme_core=debug")
//!     .format(LogFormat::Pretty)
//!     .build();
//! init_logging(&config).expect("logging init");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG` - Overrides the configured filter when set

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::constants::LOG_FILTER_DEFAULT;

/// Logging setup errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Filter directive could not be parsed
    #[error("invalid log filter {filter:?}: {reason}")]
    InvalidFilter {
        /// The rejected directive
        filter: String,
        /// Parser message
        reason: String,
    },

    /// Subscriber could not be installed (usually: one already is)
    #[error("logging initialization failed: {reason}")]
    InitFailed {
        /// The reason for the failure
        reason: String,
    },
}

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Output layout of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single line, abbreviated
    #[default]
    Compact,
    /// Single line with span context
    Full,
    /// Multi-line, human oriented
    Pretty,
}

/// Configuration for the `tracing` subscriber
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `pickme_core=info`
    pub filter: String,

    /// Line layout
    pub format: LogFormat,

    /// Print the event target (module path)
    pub with_target: bool,

    /// Use ANSI colours
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: LOG_FILTER_DEFAULT.to_string(),
            format: LogFormat::default(),
            with_target: true,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Create a new builder for `LoggingConfig`
    #[must_use]
    pub fn builder() -> LoggingConfigBuilder {
        LoggingConfigBuilder::default()
    }

    /// Check that the filter parses.
    ///
    /// # Errors
    /// Returns `InvalidFilter` if the directive is empty or malformed.
    pub fn validate(&self) -> Result<()> {
        self.env_filter().map(|_| ())
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        if self.filter.trim().is_empty() {
            return Err(TelemetryError::InvalidFilter {
                filter: self.filter.clone(),
                reason: "filter cannot be empty".to_string(),
            });
        }

        EnvFilter::try_new(&self.filter).map_err(|e| TelemetryError::InvalidFilter {
            filter: self.filter.clone(),
            reason: e.to_string(),
        })
    }
}

/// Builder for `LoggingConfig`
#[derive(Debug, Default)]
pub struct LoggingConfigBuilder {
    filter: Option<String>,
    format: Option<LogFormat>,
    with_target: Option<bool>,
    ansi: Option<bool>,
}

impl LoggingConfigBuilder {
    /// Set the filter directive
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the line layout
    #[must_use]
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Show or hide the event target
    #[must_use]
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = Some(with_target);
        self
    }

    /// Enable or disable ANSI colours
    #[must_use]
    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = Some(ansi);
        self
    }

    /// Build the `LoggingConfig`
    #[must_use]
    pub fn build(self) -> LoggingConfig {
        let default = LoggingConfig::default();
        LoggingConfig {
            filter: self.filter.unwrap_or(default.filter),
            format: self.format.unwrap_or(default.format),
            with_target: self.with_target.unwrap_or(default.with_target),
            ansi: self.ansi.unwrap_or(default.ansi),
        }
    }
}

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `config.filter` when it is set and valid.
///
/// # Errors
///
/// Returns `InvalidFilter` if the configured filter does not parse, and
/// `InitFailed` if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.env_filter()?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_ansi(config.ansi);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Full => builder.try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    installed.map_err(|e| TelemetryError::InitFailed {
        reason: e.to_string(),
    })?;

    tracing::debug!(filter = %config.filter, format = ?config.format, "logging initialized");
    Ok(())
}
