//! Environment variable handling.

use std::env;

/// Look up a variable, treating empty values as unset.
pub fn lookup(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.is_empty())
}

// Runtime selection

/// Get the Node.js executable to introspect (`HADRON_NODE`).
pub fn node_executable() -> Option<String> {
    lookup("HADRON_NODE")
}

// Cache configuration

/// Get the cache root override (`HADRON_CACHE_DIR`).
pub fn cache_dir() -> Option<String> {
    lookup("HADRON_CACHE_DIR")
}

/// Get the network timeout in seconds (`HADRON_TIMEOUT`, ignored if not a number).
pub fn timeout_secs() -> Option<u64> {
    lookup("HADRON_TIMEOUT").and_then(|s| s.parse().ok())
}

// Proxy support is handled by reqwest itself; these are only reported by `hadron env`

/// Get HTTP/HTTPS proxy URL (checks `HTTPS_PROXY` then `HTTP_PROXY`).
pub fn http_proxy() -> Option<String> {
    env::var("HTTPS_PROXY")
        .or_else(|_| env::var("https_proxy"))
        .or_else(|_| env::var("HTTP_PROXY"))
        .or_else(|_| env::var("http_proxy"))
        .ok()
}

/// Get `NO_PROXY` list (comma-separated hosts to bypass proxy).
pub fn no_proxy() -> Option<String> {
    env::var("NO_PROXY").or_else(|_| env::var("no_proxy")).ok()
}

/// Variables shown by `hadron env`.
pub const REPORTED_VARS: &[&str] = &[
    "HADRON_NODE",
    "HADRON_CACHE_DIR",
    "HADRON_TIMEOUT",
    "HOME",
    "LOCALAPPDATA",
    "XDG_CONFIG_HOME",
    "RUST_LOG",
    "PATH",
];
