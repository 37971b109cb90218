//! Shared test helpers and utilities

use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Get the path to the hadron binary built for this test run
pub(crate) fn get_hadron_binary() -> String {
    env!("CARGO_BIN_EXE_hadron").to_string()
}

/// A hadron command isolated from the user's home, config and environment.
///
/// `HOME` and `XDG_CONFIG_HOME` point inside `sandbox`, which is also the
/// working directory, so no `.hadron.toml` leaks in.
#[allow(dead_code)]
pub(crate) fn hadron_command(sandbox: &TempDir) -> Command {
    let home = sandbox.path().join("home");
    fs::create_dir_all(&home).expect("Failed to create home");

    let mut command = Command::new(get_hadron_binary());
    command
        .current_dir(sandbox.path())
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", sandbox.path().join("config"))
        .env_remove("HADRON_NODE")
        .env_remove("HADRON_CACHE_DIR")
        .env_remove("HADRON_TIMEOUT")
        .env_remove("RUST_LOG");
    command
}

/// Identity JSON as printed by a real runtime
#[allow(dead_code)]
pub(crate) fn identity_json(version: &str, headers_url: Option<&str>) -> String {
    let headers = headers_url.map_or_else(String::new, |url| format!(r#","headersUrl":"{url}""#));
    format!(r#"{{"version":"{version}","release":{{"name":"node"{headers}}}}}"#)
}

/// Write an executable script that prints `output` whatever it is asked
#[cfg(unix)]
#[allow(dead_code)]
pub(crate) fn fake_node(dir: &std::path::Path, output: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-node");
    let script = format!("#!/bin/sh\ncat <<'JSON'\n{output}\nJSON\n");
    fs::write(&path, script).expect("Failed to write fake node");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake node executable");
    path
}
