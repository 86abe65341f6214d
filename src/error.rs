//! Error handling types and utilities.

use std::path::PathBuf;

/// Error returned when a search configuration cannot be loaded or is invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for [`crate::SearchConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A weight or threshold is outside its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Failure reported by an external collaborator (author lookup, re-ranker).
///
/// The engine never surfaces these to its caller: they are logged and the
/// query continues in the next safest mode.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The backing data source could not be reached.
    #[error("data source unavailable: {0}")]
    Unavailable(String),
    /// The caller-supplied deadline expired before the collaborator answered.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// Any other backend failure.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
