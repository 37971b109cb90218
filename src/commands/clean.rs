//! Clean command
//!
//! Remove cached distributions

use super::Context;
use anyhow::{Context as _, Result};
use hadron::cache;
use hadron::human_bytes;

/// Remove the current runtime's distribution, or every one with `all`
///
/// Removing a partial entry is how an interrupted download is repaired.
pub(crate) fn run(context: &Context, all: bool) -> Result<()> {
    let targets = if all {
        let root = context.namespace_root()?;
        cache::list_entries(&root)
            .with_context(|| format!("Failed to read cache directory {}", root.display()))?
            .into_iter()
            .map(|entry| entry.path)
            .collect()
    } else {
        vec![context.detect()?.cache_dir().to_path_buf()]
    };

    let mut removed = 0;
    let mut freed = 0;
    for path in &targets {
        if !path.exists() {
            continue;
        }
        freed += cache::remove_entry(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        removed += 1;
        println!("Removed {}", path.display());
    }

    if removed == 0 {
        println!("Nothing to clean");
    } else {
        println!("Freed {} from {removed} distribution(s)", human_bytes(freed));
    }
    Ok(())
}
