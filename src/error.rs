//! Error types.
//!
//! The state systems themselves have no runtime failure modes; these cover
//! caller contract violations and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid disclosure list access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisclosureError {
    #[error("disclosure index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no disclosure entry with key {0:?}")]
    UnknownKey(String),
}

/// Errors during page configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read page config {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse page config")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate section id {0:?}")]
    DuplicateSection(String),

    #[error("duplicate disclosure key {0:?}")]
    DuplicateKey(String),
}
