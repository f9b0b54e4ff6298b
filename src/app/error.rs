//! Error taxonomy for scanning and selection.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Problems met while scanning.
///
/// Everything except [`ScanError::InvalidConfiguration`] is non-fatal and is
/// delivered through an [`ErrorSink`](crate::app::sink::ErrorSink).
#[derive(Error, Debug)]
pub enum ScanError {
    /// A configured base directory does not exist.
    #[error("base folder does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    /// A directory could not be listed.
    #[error("failed to read directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A symbolic link could not be resolved to a target.
    #[error("failed to resolve symlink {}: {source}", path.display())]
    SymlinkResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The scan job was rejected before traversal started.
    #[error("invalid scan configuration: {message}")]
    InvalidConfiguration { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    NotFound,
    Unreadable,
    SymlinkResolution,
    InvalidConfiguration,
}

impl ScanError {
    pub fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub fn symlink_resolution(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::SymlinkResolution {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ScanErrorKind {
        match self {
            ScanError::NotFound { .. } => ScanErrorKind::NotFound,
            ScanError::Unreadable { .. } => ScanErrorKind::Unreadable,
            ScanError::SymlinkResolution { .. } => ScanErrorKind::SymlinkResolution,
            ScanError::InvalidConfiguration { .. } => ScanErrorKind::InvalidConfiguration,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ScanError::NotFound { path }
            | ScanError::Unreadable { path, .. }
            | ScanError::SymlinkResolution { path, .. } => Some(path),
            ScanError::InvalidConfiguration { .. } => None,
        }
    }
}

/// Why a selector did not resolve to exactly one catalog entry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no projects found")]
    Empty,

    #[error("invalid selection {index}: expected a number between 1 and {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("project '{0}' not found")]
    NotFound(String),

    #[error("multiple projects match '{selector}': {}", candidates.join(", "))]
    Ambiguous {
        selector: String,
        candidates: Vec<String>,
    },
}
