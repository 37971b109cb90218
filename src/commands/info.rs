//! Info command
//!
//! Show what the runtime reports about itself

use super::Context;
use anyhow::{Context as _, Result};

/// Print the runtime identity and its cache directory
pub(crate) fn run(context: &Context, json: bool) -> Result<()> {
    let handle = context.detect()?;
    let identity = handle.identity();

    if json {
        let output =
            serde_json::to_string_pretty(identity).context("Failed to serialize identity")?;
        println!("{output}");
        return Ok(());
    }

    println!("*** {} {}", identity.release_name, identity.version);
    println!();
    println!("Executable: {}", context.runtime().executable());
    println!("Platform:   {}", context.family);
    if let Some(version) = identity.semver() {
        println!("Semver:     {version}");
    }
    println!(
        "Headers:    {}",
        identity.headers_url.as_deref().unwrap_or("(none)")
    );
    if let Some(lib_url) = &identity.lib_url {
        println!("Library:    {lib_url}");
    }
    println!("Cache:      {}", handle.cache_dir().display());

    let cached = if handle.cache_dir().exists() { "yes" } else { "no" };
    println!("Cached:     {cached}");
    Ok(())
}
