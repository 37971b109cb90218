//! Fetch command
//!
//! Download the runtime's header distribution into the cache

use super::Context;
use anyhow::Result;

/// Make sure the headers are cached and print where they are
pub(crate) async fn run(context: &Context, quiet: bool) -> Result<()> {
    let handle = context.acquire(!quiet).await?;

    if quiet {
        println!("{}", handle.cache_dir().display());
        return Ok(());
    }

    let identity = handle.identity();
    println!(
        "Node.js {} ({}) headers ready",
        identity.version, identity.release_name
    );
    println!("  Distribution: {}", handle.cache_dir().display());
    println!("  Include dir:  {}", handle.include_dir().display());
    Ok(())
}
