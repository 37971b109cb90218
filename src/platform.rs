//! Platform detection and cache directory layout
//!
//! Maps the host operating system to a platform family and computes the
//! per-runtime cache directory for that family. Locating is pure: nothing
//! here touches the filesystem.

use crate::error::AcquireError;
use crate::runtime::RuntimeIdentity;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

/// Directory name shared by every cached runtime distribution
pub const CACHE_NAMESPACE: &str = "node-hadron";

/// Operating system families with a known cache convention
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    /// Linux and the BSDs (XDG-style `~/.cache`)
    Linux,
    /// macOS and iOS (`~/Library/Caches`)
    Apple,
    /// Windows (`%LOCALAPPDATA%`)
    Windows,
    /// Anything else, carrying the OS name
    Other(String),
}

impl PlatformFamily {
    /// Family of the running host
    #[must_use]
    pub fn current() -> Self {
        Self::from_os(env::consts::OS)
    }

    /// Family for an OS name as spelled by `std::env::consts::OS`
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os.trim().to_lowercase().as_str() {
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Self::Linux,
            "macos" | "darwin" | "ios" => Self::Apple,
            "windows" | "win32" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }

    /// Short name, as accepted by [`PlatformFamily::from_os`]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Apple => "macos",
            Self::Windows => "windows",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a platform family keeps per-user caches
#[derive(Debug)]
struct CacheLayout {
    family: PlatformFamily,
    base_var: &'static str,
    fallback: &'static str,
    segments: &'static [&'static str],
}

const CACHE_LAYOUTS: &[CacheLayout] = &[
    CacheLayout {
        family: PlatformFamily::Linux,
        base_var: "HOME",
        fallback: "/tmp",
        segments: &[".cache"],
    },
    CacheLayout {
        family: PlatformFamily::Apple,
        base_var: "HOME",
        fallback: "/tmp",
        segments: &["Library", "Caches"],
    },
    CacheLayout {
        family: PlatformFamily::Windows,
        base_var: "LOCALAPPDATA",
        fallback: "C:\\",
        segments: &[],
    },
];

/// Root holding every cached runtime for `family` (`<base>/node-hadron`).
pub fn namespace_root_with<F>(
    family: &PlatformFamily,
    lookup: F,
) -> Result<PathBuf, AcquireError>
where
    F: Fn(&str) -> Option<String>,
{
    let layout = CACHE_LAYOUTS
        .iter()
        .find(|layout| layout.family == *family)
        .ok_or_else(|| AcquireError::UnsupportedPlatform {
            platform: family.to_string(),
        })?;

    let base = lookup(layout.base_var)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| layout.fallback.to_string());

    let mut root = PathBuf::from(base);
    root.extend(layout.segments);
    root.push(CACHE_NAMESPACE);
    Ok(root)
}

/// Cache directory for `identity`, reading the real environment.
///
/// # Errors
///
/// Returns `UnsupportedPlatform` for families without a cache convention.
pub fn locate(
    identity: &RuntimeIdentity,
    family: &PlatformFamily,
) -> Result<PathBuf, AcquireError> {
    locate_with(identity, family, crate::env_vars::lookup)
}

/// Cache directory for `identity`, reading variables through `lookup`.
///
/// Layout: `<base>/node-hadron/<release name>/<version>`.
pub fn locate_with<F>(
    identity: &RuntimeIdentity,
    family: &PlatformFamily,
    lookup: F,
) -> Result<PathBuf, AcquireError>
where
    F: Fn(&str) -> Option<String>,
{
    let root = namespace_root_with(family, lookup)?;
    entry_under(&root, identity)
}

/// `<root>/<release name>/<version>`, for roots that replace the platform default.
///
/// Identity fields are public, so they are checked again here: a release name
/// or version that is not a single plain path component is rejected.
pub fn entry_under(root: &Path, identity: &RuntimeIdentity) -> Result<PathBuf, AcquireError> {
    identity.validate("<cache path>")?;
    Ok(root.join(&identity.release_name).join(&identity.version))
}
