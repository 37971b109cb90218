//! Cache command
//!
//! List cached distributions and their sizes

use super::Context;
use anyhow::{Context as _, Result};
use hadron::cache::{self, Stats};
use hadron::human_bytes;

/// List every cached distribution under the namespace root
pub(crate) fn run(context: &Context) -> Result<()> {
    let root = context.namespace_root()?;
    let entries = cache::list_entries(&root)
        .with_context(|| format!("Failed to read cache directory {}", root.display()))?;

    println!("Cache directory: {}", root.display());
    if entries.is_empty() {
        println!("No cached distributions");
        return Ok(());
    }
    println!();

    let mut total = Stats::default();
    for entry in &entries {
        let stats = cache::collect_stats(&entry.path);
        total.files += stats.files;
        total.total_size += stats.total_size;
        println!(
            "  {:<10} {:<12} {:>6} files  {:>10}",
            entry.release_name,
            entry.version,
            stats.files,
            human_bytes(stats.total_size)
        );
    }

    println!();
    println!(
        "{} distribution(s), {} files, {}",
        entries.len(),
        total.files,
        human_bytes(total.total_size)
    );
    Ok(())
}
