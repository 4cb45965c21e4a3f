//! Error types for generation runs
//!
//! Only top-level failures are errors. A declaration that does not match the
//! expected shape is a [`Diagnostic`](crate::diagnostics::Diagnostic) and the
//! run continues.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for generation operations
pub type GenResult<T> = Result<T, GenError>;

/// Error type for generation operations
#[derive(Error, Debug)]
pub enum GenError {
    /// An input or configuration file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed or is inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// The input holds nothing the requested mode can work with
    #[error("invalid input: {0}")]
    Input(String),
}

impl From<toml::de::Error> for GenError {
    fn from(err: toml::de::Error) -> Self {
        GenError::Config(err.to_string())
    }
}
