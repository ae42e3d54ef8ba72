//! Engine configuration module.
//!
//! This module provides configuration loading for the evaluator from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `ENGINE_FULL_TRIPLE_INDEXING`: Use two-term dataset lookups (default: `true`)
//! - `ENGINE_QUERY_TIMEOUT_MS`: Per-query time budget in milliseconds, `0`
//!   disables the timeout (default: `180000`)
//!
//! # Invariants
//!
//! - `query_timeout_ms` is never `Some(0)`

/// Engine configuration.
///
/// Shared read-only by every evaluation that uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Whether the dataset serves the two-term lookups efficiently.
    /// When false, two-term index paths fall back to one term plus an
    /// in-memory filter.
    pub full_triple_indexing: bool,
    /// Time budget for one query. `None` disables the timeout.
    pub query_timeout_ms: Option<u64>,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            full_triple_indexing: true,
            query_timeout_ms: Some(Self::DEFAULT_QUERY_TIMEOUT_MS),
        }
    }
}

impl EngineConfig {
    /// Default query time budget: three minutes.
    pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 180_000;

    const FULL_TRIPLE_INDEXING_VAR: &'static str = "ENGINE_FULL_TRIPLE_INDEXING";
    const QUERY_TIMEOUT_VAR: &'static str = "ENGINE_QUERY_TIMEOUT_MS";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let full_triple_indexing =
            Self::load_full_triple_indexing(lookup(Self::FULL_TRIPLE_INDEXING_VAR))?;
        let query_timeout_ms = Self::load_query_timeout(lookup(Self::QUERY_TIMEOUT_VAR))?;

        Ok(Self {
            full_triple_indexing,
            query_timeout_ms,
        })
    }

    /// Disable the query timeout.
    #[must_use]
    pub const fn without_timeout(mut self) -> Self {
        self.query_timeout_ms = None;
        self
    }

    /// Set the query timeout. `0` disables it.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.query_timeout_ms = if timeout_ms == 0 {
            None
        } else {
            Some(timeout_ms)
        };
        self
    }

    /// Enable or disable two-term dataset lookups.
    #[must_use]
    pub const fn with_full_triple_indexing(mut self, enabled: bool) -> Self {
        self.full_triple_indexing = enabled;
        self
    }

    fn load_full_triple_indexing(value: Option<String>) -> Result<bool, ConfigError> {
        let Some(value) = value else {
            return Ok(true);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: Self::FULL_TRIPLE_INDEXING_VAR.to_string(),
                message: format!("'{value}' is not a boolean (expected true, false, 1 or 0)"),
            }),
        }
    }

    fn load_query_timeout(value: Option<String>) -> Result<Option<u64>, ConfigError> {
        let Some(value) = value else {
            return Ok(Some(Self::DEFAULT_QUERY_TIMEOUT_MS));
        };
        let timeout_ms = value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue {
                name: Self::QUERY_TIMEOUT_VAR.to_string(),
                message: format!("'{value}' is not a number of milliseconds"),
            })?;
        Ok((timeout_ms != 0).then_some(timeout_ms))
    }
}
