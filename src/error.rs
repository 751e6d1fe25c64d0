//! Errors that abort a whole run.
//!
//! Failures tied to a single file never show up here; the organizer records
//! them as skipped entries and keeps going.

use crate::config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors reported before any file is touched.
#[derive(Error, Debug)]
pub enum SortError {
    /// The requested profile is not part of the configured profile set.
    #[error("Unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    /// The target path does not exist or is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A filesystem operation needed to set up the run failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SortError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SortError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for whole-run operations.
pub type Result<T> = std::result::Result<T, SortError>;
