//! Acquisition failures
//!
//! Every step of acquiring a runtime distribution fails with one of these
//! variants. None of them is retried; the caller decides whether to clean up
//! and try again.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed source error for transports that are not backed by reqwest.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("Failed spawning runtime `{executable}`: {source}")]
    RuntimeNotFound {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unusable output from runtime `{executable}`: {reason}")]
    IdentityParseError { executable: String, reason: String },

    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    #[error("Network error fetching {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("Invalid archive {url}: {source}")]
    ArchiveFormatError {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Filesystem error at {}: {source}", path.display())]
    FilesystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AcquireError {
    /// Wrap an IO error with path context for use in `map_err`
    pub fn wrap_fs(path: impl AsRef<Path>) -> impl Fn(std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::FilesystemError {
            path: path.clone(),
            source,
        }
    }

    /// Wrap a network error with URL context for use in `map_err`
    pub fn wrap_network<E>(url: impl Into<String>) -> impl Fn(E) -> Self
    where
        E: Into<BoxError>,
    {
        let url = url.into();
        move |source| Self::NetworkError {
            url: url.clone(),
            source: source.into(),
        }
    }

    /// Wrap an archive decoding error with URL context for use in `map_err`
    pub fn wrap_archive(url: impl Into<String>) -> impl Fn(std::io::Error) -> Self {
        let url = url.into();
        move |source| Self::ArchiveFormatError {
            url: url.clone(),
            source,
        }
    }

    pub(crate) fn identity(executable: &str, reason: impl Into<String>) -> Self {
        Self::IdentityParseError {
            executable: executable.to_string(),
            reason: reason.into(),
        }
    }
}
