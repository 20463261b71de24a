//! Error types for the overlay engine.
//!
//! Detection never fails: a stylesheet without a tint or an accent simply
//! yields `None`. The variants here cover the few conditions a caller has to
//! hear about.

use thiserror::Error;

use crate::source::SourceFile;

/// Errors surfaced by [`OverlayEngine`](crate::OverlayEngine) and the settings layer.
#[derive(Debug, Error)]
pub enum Error {
    /// The stylesheet source failed to read a file that exists.
    #[error("failed to load {file} stylesheet for theme '{theme}': {source}")]
    Source {
        theme: String,
        file: SourceFile,
        #[source]
        source: std::io::Error,
    },

    /// A settings document could not be parsed.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_yaml::Error),

    /// Cache key or cache payload (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
