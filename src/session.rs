//! Runtime handle
//!
//! Identity and cache location are computed once per process and then passed
//! by reference to every step that needs them.

use crate::download::{FetchOutcome, Fetcher, Transport};
use crate::error::AcquireError;
use crate::platform::{self, PlatformFamily};
use crate::runtime::{Runtime, RuntimeIdentity};
use std::path::{Path, PathBuf};

/// A runtime identity and its cache directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeHandle {
    identity: RuntimeIdentity,
    cache_dir: PathBuf,
}

impl RuntimeHandle {
    #[must_use]
    pub const fn new(identity: RuntimeIdentity, cache_dir: PathBuf) -> Self {
        Self {
            identity,
            cache_dir,
        }
    }

    /// Introspect `runtime` and locate its cache directory.
    ///
    /// With `cache_root`, the directory is `<cache_root>/<release>/<version>`
    /// instead of the platform default.
    pub fn detect(
        runtime: &Runtime,
        family: &PlatformFamily,
        cache_root: Option<&Path>,
    ) -> Result<Self, AcquireError> {
        let identity = runtime.identify()?;
        Self::for_identity(identity, family, cache_root)
    }

    /// Locate the cache directory for a known identity.
    pub fn for_identity(
        identity: RuntimeIdentity,
        family: &PlatformFamily,
        cache_root: Option<&Path>,
    ) -> Result<Self, AcquireError> {
        let cache_dir = match cache_root {
            Some(root) => platform::entry_under(root, &identity)?,
            None => platform::locate(&identity, family)?,
        };
        Ok(Self::new(identity, cache_dir))
    }

    #[must_use]
    pub const fn identity(&self) -> &RuntimeIdentity {
        &self.identity
    }

    /// Directory holding the extracted distribution
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Directory with `node_api.h` and friends
    #[must_use]
    pub fn include_dir(&self) -> PathBuf {
        self.cache_dir.join("include").join("node")
    }

    /// Make sure the headers (and, where published, the import library) are cached.
    ///
    /// Returns what happened to each asset, headers first.
    ///
    /// # Errors
    ///
    /// The first failing fetch aborts the acquisition.
    pub async fn acquire<T: Transport + Sync>(
        &self,
        fetcher: &Fetcher<T>,
    ) -> Result<Vec<FetchOutcome>, AcquireError> {
        let mut outcomes = Vec::new();
        for url in [&self.identity.headers_url, &self.identity.lib_url]
            .into_iter()
            .flatten()
        {
            outcomes.push(fetcher.fetch(url, &self.cache_dir).await?);
        }

        tracing::info!("Node.js library distribution: {}", self.cache_dir.display());
        Ok(outcomes)
    }
}
