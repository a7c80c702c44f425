//! Error types for the proto2openapi crate.

use std::path::PathBuf;

/// Errors that can occur while converting a protobuf definition.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The protobuf source could not be parsed.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// A field name could not be mapped to a property name.
    #[error("malformed field name: {0}")]
    MalformedFieldName(String),

    /// Failed to read the protobuf source from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the generated schema document.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
