//! Cache statistics and management
//!
//! Lists cached runtime distributions, calculates their size and removes
//! entries (for example one left incomplete by an older version).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Number of files in cache
    pub files: usize,
    /// Total size in bytes
    pub total_size: u64,
}

/// Collect statistics from a cache directory
///
/// Returns empty stats if directory doesn't exist (not an error).
/// Symlinks are not followed.
pub fn collect_stats<P: AsRef<Path>>(cache_dir: P) -> Stats {
    let mut stats = Stats::default();

    for entry in WalkDir::new(cache_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.file_type().is_file()
            && let Ok(metadata) = entry.metadata()
        {
            stats.files += 1;
            stats.total_size += metadata.len();
        }
    }

    stats
}

/// A cached distribution: `<root>/<release>/<version>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub release_name: String,
    pub version: String,
    pub path: PathBuf,
}

/// List cached distributions under a namespace root, sorted by release then version.
///
/// A missing root yields an empty list.
pub fn list_entries(root: &Path) -> io::Result<Vec<CacheEntry>> {
    let mut entries = Vec::new();
    if !root.is_dir() {
        return Ok(entries);
    }

    for release in fs::read_dir(root)? {
        let release = release?;
        if !release.file_type()?.is_dir() {
            continue;
        }
        let release_name = release.file_name().to_string_lossy().into_owned();

        for version in fs::read_dir(release.path())? {
            let version = version?;
            let name = version.file_name().to_string_lossy().into_owned();
            // staging directories from interrupted downloads
            if name.starts_with('.') || !version.file_type()?.is_dir() {
                continue;
            }
            entries.push(CacheEntry {
                release_name: release_name.clone(),
                version: name,
                path: version.path(),
            });
        }
    }

    entries.sort_by(|a, b| {
        a.release_name
            .cmp(&b.release_name)
            .then_with(|| compare_versions(&a.version, &b.version))
    });
    Ok(entries)
}

fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    let parse = |v: &str| semver::Version::parse(v.trim_start_matches('v')).ok();
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Remove a cached entry and everything below it. Returns the bytes freed.
///
/// A missing entry frees nothing.
pub fn remove_entry(path: &Path) -> io::Result<u64> {
    if !path.exists() {
        return Ok(0);
    }
    let freed = collect_stats(path).total_size;
    fs::remove_dir_all(path)?;
    Ok(freed)
}

/// Convert bytes to human-readable format using binary units (1 KiB = 1024 bytes).
/// Examples: 512 -> "512 B", 1024 -> "1.0 KiB", 1048576 -> "1.0 MiB"
#[must_use]
pub fn human_bytes(size: u64) -> String {
    const UNIT: u64 = 1024;
    const UNITS: &[char] = &['K', 'M', 'G', 'T', 'P', 'E'];

    if size < UNIT {
        return format!("{size} B");
    }

    let mut div = UNIT;
    let mut exp = 0;
    while size / div >= UNIT && exp < UNITS.len() - 1 {
        div *= UNIT;
        exp += 1;
    }

    let unit = UNITS.get(exp).copied().unwrap_or('?');
    format!("{:.1} {unit}iB", size as f64 / div as f64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populate(root: &Path, release: &str, version: &str, bytes: usize) -> PathBuf {
        let dir = root.join(release).join(version);
        fs::create_dir_all(dir.join("include/node")).unwrap();
        fs::write(dir.join("include/node/node_api.h"), vec![b'x'; bytes]).unwrap();
        dir
    }

    #[test]
    fn collect_stats_empty_dir() {
        let tmp_dir = TempDir::new().unwrap();
        let stats = collect_stats(tmp_dir.path());
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn collect_stats_nonexistent_dir() {
        let stats = collect_stats("/nonexistent/directory/path");
        assert_eq!(stats.files, 0);
        assert_eq!(stats.total_size, 0);
    }

    #[test]
    fn collect_stats_nested_files() {
        let tmp_dir = TempDir::new().unwrap();
        populate(tmp_dir.path(), "node", "v20.11.0", 100);
        populate(tmp_dir.path(), "node", "v22.1.0", 50);

        let stats = collect_stats(tmp_dir.path());
        assert_eq!(stats.files, 2);
        assert_eq!(stats.total_size, 150);
    }

    #[test]
    fn list_entries_sorted_by_version() {
        let tmp_dir = TempDir::new().unwrap();
        populate(tmp_dir.path(), "node", "v9.0.0", 1);
        populate(tmp_dir.path(), "node", "v20.11.0", 1);
        populate(tmp_dir.path(), "io.js", "v3.3.1", 1);
        fs::create_dir_all(tmp_dir.path().join("node/.partial-abc")).unwrap();

        let entries = list_entries(tmp_dir.path()).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|e| format!("{}/{}", e.release_name, e.version))
            .collect();
        assert_eq!(names, vec!["io.js/v3.3.1", "node/v9.0.0", "node/v20.11.0"]);
    }

    #[test]
    fn list_entries_missing_root() {
        let tmp_dir = TempDir::new().unwrap();
        assert!(list_entries(&tmp_dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn remove_entry_frees_space() {
        let tmp_dir = TempDir::new().unwrap();
        let dir = populate(tmp_dir.path(), "node", "v20.11.0", 2048);

        assert_eq!(remove_entry(&dir).unwrap(), 2048);
        assert!(!dir.exists());
        assert_eq!(remove_entry(&dir).unwrap(), 0);
    }

    #[test]
    fn human_bytes_basic() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(1023), "1023 B");
    }

    #[test]
    fn human_bytes_units() {
        assert_eq!(human_bytes(1024), "1.0 KiB");
        assert_eq!(human_bytes(1536), "1.5 KiB");
        assert_eq!(human_bytes(1024 * 1024 * 10), "10.0 MiB");
        assert_eq!(human_bytes(6_120_335_360), "5.7 GiB");
        assert_eq!(human_bytes(1024_u64.pow(6)), "1.0 EiB");
    }
}
