//! Subcommand implementations

pub(crate) mod cache;
pub(crate) mod clean;
pub(crate) mod completion;
pub(crate) mod env;
pub(crate) mod fetch;
pub(crate) mod flags;
pub(crate) mod info;
pub(crate) mod locate;

use anyhow::{Context as _, Result};
use hadron::config::CliOverrides;
use hadron::{Config, Fetcher, HttpTransport, PlatformFamily, Runtime, RuntimeHandle, Settings};
use std::path::{Path, PathBuf};

/// Settings shared by every command that touches the runtime or the cache
#[derive(Debug)]
pub(crate) struct Context {
    pub(crate) settings: Settings,
    pub(crate) family: PlatformFamily,
}

impl Context {
    pub(crate) fn load(
        config_path: Option<&Path>,
        no_config: bool,
        cli: CliOverrides,
    ) -> Result<Self> {
        let config = Config::load_with_options(config_path, no_config)?;
        Ok(Self {
            settings: Settings::resolve(config, cli),
            family: PlatformFamily::current(),
        })
    }

    pub(crate) fn runtime(&self) -> Runtime {
        Runtime::new(self.settings.node.as_str())
    }

    pub(crate) fn cache_root(&self) -> Option<&Path> {
        self.settings.cache_root.as_deref()
    }

    /// Directory holding every cached distribution
    pub(crate) fn namespace_root(&self) -> Result<PathBuf> {
        match self.cache_root() {
            Some(root) => Ok(root.to_path_buf()),
            None => Ok(hadron::platform::namespace_root_with(
                &self.family,
                hadron::env_vars::lookup,
            )?),
        }
    }

    /// Introspect the configured runtime
    pub(crate) fn detect(&self) -> Result<RuntimeHandle> {
        let runtime = self.runtime();
        RuntimeHandle::detect(&runtime, &self.family, self.cache_root())
            .with_context(|| format!("Failed to detect runtime `{}`", runtime.executable()))
    }

    fn fetcher(&self, show_progress: bool) -> Result<Fetcher<HttpTransport>> {
        let transport = HttpTransport::with_timeout(self.settings.timeout)
            .context("Failed to create HTTP client")?
            .with_progress(show_progress);
        Ok(Fetcher::new(transport))
    }

    /// Detect the runtime and make sure its distribution is cached
    pub(crate) async fn acquire(&self, show_progress: bool) -> Result<RuntimeHandle> {
        let handle = self.detect()?;
        let fetcher = self.fetcher(show_progress)?;
        handle
            .acquire(&fetcher)
            .await
            .context("Failed to acquire Node.js headers")?;
        Ok(handle)
    }
}
