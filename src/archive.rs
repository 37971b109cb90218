//! Archive extraction
//!
//! Distribution archives wrap their contents in a single `name-version/`
//! directory. Extraction drops that first component so the contents land
//! directly in the destination.

use crate::error::AcquireError;
use flate2::read::GzDecoder;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

/// Suffixes that mark a URL as a gzip-compressed tarball
pub const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz"];

/// Remove the first component of an archive entry path.
///
/// Returns `Ok(None)` when nothing is left (the wrapper directory itself).
/// `.` components are ignored. Entries that would escape the destination
/// (`..`, absolute paths, drive prefixes) are rejected.
pub fn strip_leading_component(entry: &Path) -> io::Result<Option<PathBuf>> {
    let mut stripped = PathBuf::new();
    let mut seen_leading = false;

    for component in entry.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) if seen_leading => stripped.push(part),
            Component::Normal(_) => seen_leading = true,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_entry(format!(
                    "unsafe archive entry path: {}",
                    entry.display()
                )));
            }
        }
    }

    Ok((!stripped.as_os_str().is_empty()).then_some(stripped))
}

fn unsafe_entry(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Links may only point at siblings or descendants of their own directory.
///
/// `Entry::unpack` does not check where a link leads, so an entry such as
/// `pkg/include -> /elsewhere` followed by `pkg/include/x.h` would write
/// outside the destination. Hard links resolve against the working
/// directory, so they are refused outright.
fn check_link(entry_type: EntryType, entry: &Path, link: Option<&Path>) -> io::Result<()> {
    if entry_type.is_hard_link() {
        return Err(unsafe_entry(format!(
            "hard link entries are not supported: {}",
            entry.display()
        )));
    }
    if !entry_type.is_symlink() {
        return Ok(());
    }

    let link = link.ok_or_else(|| {
        unsafe_entry(format!("symlink without a target: {}", entry.display()))
    })?;
    if link
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(unsafe_entry(format!(
            "symlink {} points outside the archive: {}",
            entry.display(),
            link.display()
        )));
    }
    Ok(())
}

/// Extract a `.tar.gz` held in memory into `destination`, stripping one
/// leading component from every entry.
///
/// `url` only labels errors.
///
/// # Errors
///
/// `ArchiveFormatError` if the data cannot be decoded or holds unsafe paths
/// or links, `FilesystemError` if writing under `destination` fails.
pub fn extract(bytes: &[u8], destination: &Path, url: &str) -> Result<usize, AcquireError> {
    fs::create_dir_all(destination).map_err(AcquireError::wrap_fs(destination))?;

    let mut archive = Archive::new(GzDecoder::new(bytes));

    let mut extracted = 0;
    for entry in archive.entries().map_err(AcquireError::wrap_archive(url))? {
        let mut entry = entry.map_err(AcquireError::wrap_archive(url))?;

        if entry.header().entry_type().is_pax_global_extensions() {
            continue;
        }

        let entry_path = entry.path().map_err(AcquireError::wrap_archive(url))?.into_owned();
        let link = entry.link_name().map_err(AcquireError::wrap_archive(url))?;
        check_link(entry.header().entry_type(), &entry_path, link.as_deref())
            .map_err(AcquireError::wrap_archive(url))?;

        let Some(relative) =
            strip_leading_component(&entry_path).map_err(AcquireError::wrap_archive(url))?
        else {
            continue;
        };

        let target = destination.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(AcquireError::wrap_fs(parent))?;
        }

        entry.unpack(&target).map_err(move |source| {
            // tar reports corrupt data and failed writes through the same io::Error
            if source.kind() == io::ErrorKind::InvalidData
                || source.kind() == io::ErrorKind::UnexpectedEof
            {
                AcquireError::ArchiveFormatError {
                    url: url.to_string(),
                    source,
                }
            } else {
                AcquireError::FilesystemError {
                    path: target,
                    source,
                }
            }
        })?;
        extracted += 1;
    }

    tracing::debug!(entries = extracted, destination = %destination.display(), "Extracted archive");
    Ok(extracted)
}

/// Whether `url` names an archive (query and fragment are ignored)
#[must_use]
pub fn is_archive_url(url: &str) -> bool {
    let path = reqwest::Url::parse(url).map_or_else(
        |_| url.split(['?', '#']).next().unwrap_or(url).to_string(),
        |parsed| parsed.path().to_string(),
    );
    ARCHIVE_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}
