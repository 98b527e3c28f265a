//! Stage errors for fetch, extraction and write.

use boardscrape_browser::BrowserError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a write failed, as far as the caller needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailureKind {
    PermissionDenied,
    StorageFull,
    InvalidPath,
    Io,
}

impl WriteFailureKind {
    #[must_use]
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                Self::PermissionDenied
            }
            io::ErrorKind::StorageFull => Self::StorageFull,
            io::ErrorKind::NotFound
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::NotADirectory
            | io::ErrorKind::IsADirectory => Self::InvalidPath,
            _ => Self::Io,
        }
    }
}

impl fmt::Display for WriteFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PermissionDenied => "permission denied",
            Self::StorageFull => "storage full",
            Self::InvalidPath => "invalid path",
            Self::Io => "I/O error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed for {url} after {attempts} attempt(s): {source}")]
    Fetch {
        url: String,
        attempts: u32,
        #[source]
        source: BrowserError,
    },

    #[error("no table found in document")]
    NoTableFound,

    #[error("malformed table: {reason}")]
    MalformedTable { reason: String },

    #[error("invalid table selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("failed to write {path} ({kind}): {source}")]
    Write {
        path: PathBuf,
        kind: WriteFailureKind,
        #[source]
        source: io::Error,
    },
}

impl ScrapeError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            kind: WriteFailureKind::classify(&source),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
