//! Error types for cms-trust

use std::io;

use thiserror::Error;

/// Result type alias for cms-trust
pub type Result<T> = std::result::Result<T, Error>;

/// cms-trust errors
///
/// Authentication and authorization failures are NOT errors — they are
/// ordinary, frequent outcomes carried as values (see
/// [`crate::auth::Verification`]). This enum covers the faults that callers
/// must handle explicitly.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller requested a directory key field this crate does not support
    #[error("Unsupported key policy: {0}")]
    UnsupportedKeyPolicy(String),

    /// Backing file or network source could not be read
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
