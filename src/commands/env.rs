//! Env Command
//!
//! Displays environment information useful for debugging header downloads:
//! hadron and Node.js versions, platform, cache location and relevant
//! environment variables.

use super::Context;
use hadron::env_vars;
use std::env;

/// Display environment information
pub(crate) fn run(context: &Context) {
    println!("## Environment");
    println!();

    println!("Hadron     {}", env!("CARGO_PKG_VERSION"));

    let runtime = context.runtime();
    match runtime.identify() {
        Ok(identity) => println!(
            "Node.js    {} ({}, {})",
            identity.version,
            identity.release_name,
            runtime.executable()
        ),
        Err(e) => println!("Node.js    unavailable: {e}"),
    }
    println!();

    println!("## Platform");
    println!();
    println!("OS         {}", env::consts::OS);
    println!("Arch       {}", env::consts::ARCH);
    println!("Family     {}", context.family);
    match context.namespace_root() {
        Ok(root) => println!("Cache      {}", root.display()),
        Err(e) => println!("Cache      unavailable: {e}"),
    }
    println!("Timeout    {}s", context.settings.timeout.as_secs());
    println!();

    println!("## Environment Variables");
    println!();

    for var in env_vars::REPORTED_VARS {
        if let Some(value) = env_vars::lookup(var) {
            println!("{var:<20} {value}");
        }
    }
    if let Some(proxy) = env_vars::http_proxy() {
        println!("{:<20} {proxy}", "HTTPS_PROXY");
    }
    if let Some(no_proxy) = env_vars::no_proxy() {
        println!("{:<20} {no_proxy}", "NO_PROXY");
    }
}
