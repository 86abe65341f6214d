//! Search configuration: scoring weights, thresholds and logging.
//!
//! Weights such as the span bonus and the related-word factor are empirical and
//! exposed here so they can be tuned without touching the engine.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "THEOREM_SEARCH_CONFIG";

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "theorem-search";

/// Tunable parameters of the ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Bonus added per covered query position once accumulation is done.
    pub span_bonus_per_position: i64,
    /// Discount applied to scores propagated through related words.
    pub related_word_factor: f64,
    /// Fixed bonus added to the summed component scores of a recognized n-gram.
    pub ngram_bonus: i64,
    /// Minimum fraction of query positions the best document must cover
    /// before intersection ranking is trusted.
    pub min_span_fraction: f64,
    /// Result count used when the caller does not ask for one.
    pub default_result_count: usize,
    /// Jaro-Winkler similarity above which a literal-fallback window counts
    /// as a near-verbatim match.
    pub literal_similarity: f64,
    /// Logging setup for [`crate::tracing::init`].
    pub log: LogConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            span_bonus_per_position: 2,
            related_word_factor: 0.8,
            ngram_bonus: 1,
            min_span_fraction: 0.3,
            default_result_count: 10,
            literal_similarity: 0.9,
            log: LogConfig::default(),
        }
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default level directive, overridden by `RUST_LOG`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl SearchConfig {
    /// Parse and validate a config from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file. `~` is expanded to the home directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = PathBuf::from(&*expand_tilde(&path.as_ref().to_string_lossy()));
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Loading search config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Locate a config file and load it, falling back to defaults.
    ///
    /// Checks `$THEOREM_SEARCH_CONFIG` first, then
    /// `<config_dir>/theorem-search/config.toml`.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_path(explicit);
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::from_path(path),
            _ => {
                tracing::debug!("No search config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check that every weight is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.span_bonus_per_position < 0 {
            return Err(invalid(
                "span_bonus_per_position",
                format!("must be non-negative, got {}", self.span_bonus_per_position),
            ));
        }
        if !self.related_word_factor.is_finite() || self.related_word_factor < 0.0 {
            return Err(invalid(
                "related_word_factor",
                format!("must be a finite non-negative number, got {}", self.related_word_factor),
            ));
        }
        if self.ngram_bonus < 0 {
            return Err(invalid(
                "ngram_bonus",
                format!("must be non-negative, got {}", self.ngram_bonus),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_span_fraction) {
            return Err(invalid(
                "min_span_fraction",
                format!("must be within [0, 1], got {}", self.min_span_fraction),
            ));
        }
        if !(0.0..=1.0).contains(&self.literal_similarity) {
            return Err(invalid(
                "literal_similarity",
                format!("must be within [0, 1], got {}", self.literal_similarity),
            ));
        }
        if self.default_result_count == 0 {
            return Err(invalid("default_result_count", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// `<config_dir>/theorem-search/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
}

/// Resolve a leading `~` against the home directory for [`SearchConfig::from_path`].
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
