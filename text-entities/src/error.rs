//! Error types for the entity extraction engine.
//!
//! Extraction itself never fails; these errors only surface while the
//! [`PatternLibrary`](crate::PatternLibrary) is being built.

use thiserror::Error;

/// Result type alias for pattern library construction.
pub type Result<T> = std::result::Result<T, EntityError>;

/// Errors that can occur while building the pattern library.
#[derive(Error, Debug, Clone)]
pub enum EntityError {
    /// A TLD list was supplied without any entries.
    #[error("{0} TLD list is empty")]
    EmptyTldList(&'static str),

    /// A TLD entry cannot be used as a top-level domain.
    #[error("invalid TLD entry: {0:?}")]
    InvalidTld(String),

    /// A character class failed to compile.
    #[error("failed to compile character class `{name}`: {source}")]
    Pattern {
        /// Name of the character class.
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    /// TLD data could not be parsed.
    #[error("invalid TLD data: {0}")]
    TldData(String),
}

impl From<serde_yaml::Error> for EntityError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::TldData(err.to_string())
    }
}
