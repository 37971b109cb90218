//! Locate command
//!
//! Print the cache directory for a runtime without downloading anything

use super::Context;
use anyhow::{Context as _, Result};
use hadron::{PlatformFamily, RuntimeHandle, RuntimeIdentity};

/// Print the cache directory for the runtime, or for an explicit
/// `(release name, version)` pair
pub(crate) fn run(
    context: &Context,
    explicit: Option<(&str, &str)>,
    platform: Option<&str>,
) -> Result<()> {
    let identity = match explicit {
        Some((release_name, version)) => RuntimeIdentity::new(release_name, version)
            .context("Invalid release name or version")?,
        None => context.detect()?.identity().clone(),
    };

    let family = platform.map_or_else(|| context.family.clone(), PlatformFamily::from_os);
    let handle = RuntimeHandle::for_identity(identity, &family, context.cache_root())?;

    println!("{}", handle.cache_dir().display());
    Ok(())
}
