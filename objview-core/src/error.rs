/// Error types for loading and transforming meshes
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that can occur while loading a geometry file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The path does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// A face record cannot be used as-is.
    #[error("malformed geometry at line {line}: {reason}")]
    MalformedGeometry {
        /// 1-based line number of the offending record.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Create a `MalformedGeometry` error for the given line.
    #[must_use]
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedGeometry {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur when mutating the model.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    /// A transform input was NaN, infinite, or otherwise unusable.
    #[error("invalid argument `{name}`: {value}")]
    InvalidArgument {
        /// Name of the rejected argument.
        name: &'static str,
        /// Debug rendering of the rejected value.
        value: String,
    },
}

/// A textual command could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid command `{input}`: {reason}")]
pub struct CommandError {
    /// The command text as given.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Any failure surfaced through the command interface.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Loading failed; the previous model is intact.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A transform was rejected; no vertex was touched.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// A textual command did not parse.
    #[error(transparent)]
    Command(#[from] CommandError),
}
