//! Distribution downloads
//!
//! Fetches runtime assets into the cache. An existing target means the asset
//! is already cached; new assets are written to a temporary sibling first and
//! moved into place, so a target that exists is always complete.

use crate::archive;
use crate::error::AcquireError;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Fetches the full body of a URL.
///
/// The production implementation is [`HttpTransport`]; tests substitute
/// in-memory transports.
pub trait Transport {
    /// GET `url` and return its body. Error statuses are failures.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, AcquireError>> + Send;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    show_progress: bool,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport whose requests fail after `timeout`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("hadron/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client))
    }

    /// Wrap an already configured client
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            show_progress: true,
        }
    }

    /// Set whether to draw a progress bar while downloading
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn progress_bar(&self, url: &str, length: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = length.map_or_else(ProgressBar::new_spinner, ProgressBar::new);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(file_name(url).unwrap_or_else(|| url.to_string()));
        pb
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, AcquireError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(AcquireError::wrap_network(url))?;

        let pb = self.progress_bar(url, response.content_length());
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(AcquireError::wrap_network(url))?;
            body.extend_from_slice(&chunk);
            pb.inc(chunk.len() as u64);
        }
        pb.finish_and_clear();

        Ok(body)
    }
}

/// What a fetch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Downloaded and written to the path
    Downloaded(PathBuf),
    /// The path already existed; nothing was fetched
    Cached(PathBuf),
}

impl FetchOutcome {
    /// Target path, whether fresh or cached
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Downloaded(path) | Self::Cached(path) => path,
        }
    }
}

/// Fetches assets into cache directories
#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    transport: T,
}

impl<T: Transport + Sync> Fetcher<T> {
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Underlying transport
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `url` into `destination` unless it is already there.
    ///
    /// Archives (`.tar.gz`) are extracted into `destination` itself, with the
    /// wrapper directory stripped. Anything else is saved as
    /// `destination/<last URL path segment>`.
    ///
    /// # Errors
    ///
    /// `NetworkError`, `ArchiveFormatError` or `FilesystemError`; no retries.
    pub async fn fetch(&self, url: &str, destination: &Path) -> Result<FetchOutcome, AcquireError> {
        if archive::is_archive_url(url) {
            self.fetch_archive(url, destination).await
        } else {
            self.fetch_file(url, destination).await
        }
    }

    async fn fetch_archive(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<FetchOutcome, AcquireError> {
        if destination.exists() {
            tracing::debug!(%url, destination = %destination.display(), "Already cached");
            return Ok(FetchOutcome::Cached(destination.to_path_buf()));
        }

        tracing::info!("Downloading {url} to {}", destination.display());
        let body = self.transport.get(url).await?;

        let parent = parent_dir(destination);
        fs::create_dir_all(parent).map_err(AcquireError::wrap_fs(parent))?;
        let staging = tempfile::Builder::new()
            .prefix(".partial-")
            .tempdir_in(parent)
            .map_err(AcquireError::wrap_fs(parent))?;

        archive::extract(&body, staging.path(), url)?;

        match fs::rename(staging.path(), destination) {
            Ok(()) => Ok(FetchOutcome::Downloaded(destination.to_path_buf())),
            // Another process finished first; its copy is complete
            Err(_) if destination.exists() => {
                tracing::debug!(
                    destination = %destination.display(),
                    "Lost race, keeping existing copy"
                );
                Ok(FetchOutcome::Cached(destination.to_path_buf()))
            }
            Err(source) => Err(AcquireError::FilesystemError {
                path: destination.to_path_buf(),
                source,
            }),
        }
    }

    async fn fetch_file(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<FetchOutcome, AcquireError> {
        // Nothing has been requested yet; the problem is where to save it
        let name = file_name(url).ok_or_else(|| AcquireError::FilesystemError {
            path: destination.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("URL {url} has no file name to save under"),
            ),
        })?;
        let target = destination.join(name);

        if target.exists() {
            tracing::debug!(%url, target = %target.display(), "Already cached");
            return Ok(FetchOutcome::Cached(target));
        }

        tracing::info!("Downloading {url} to {}", target.display());
        let body = self.transport.get(url).await?;

        fs::create_dir_all(destination).map_err(AcquireError::wrap_fs(destination))?;
        let mut temp_file = tempfile::NamedTempFile::new_in(destination)
            .map_err(AcquireError::wrap_fs(destination))?;
        temp_file
            .write_all(&body)
            .map_err(AcquireError::wrap_fs(&target))?;

        temp_file
            .persist(&target)
            .map_err(|e| AcquireError::FilesystemError {
                path: target.clone(),
                source: e.error,
            })?;

        Ok(FetchOutcome::Downloaded(target))
    }
}

/// Last non-empty path segment of `url`
#[must_use]
pub fn file_name(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
