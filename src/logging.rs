//! Logging setup
//!
//! Library code emits `tracing` events; the binary installs a stderr
//! subscriber once at startup. `RUST_LOG` wins over the `--debug` flag.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Default filter directive for the given `--debug` setting
#[must_use]
pub const fn default_directive(debug: bool) -> &'static str {
    if debug { "hadron=debug" } else { "hadron=info" }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));
    let use_ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(debug)
        .without_time()
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_raises_level() {
        assert_eq!(default_directive(false), "hadron=info");
        assert_eq!(default_directive(true), "hadron=debug");
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
        tracing::debug!("still fine");
    }
}
