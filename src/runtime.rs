//! Node.js runtime introspection
//!
//! Asks an installed runtime to describe itself as JSON and parses the
//! answer into a [`RuntimeIdentity`].

use crate::error::AcquireError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::process::Command;

/// Default runtime executable, resolved through `PATH`
pub const DEFAULT_NODE: &str = "node";

const IDENTITY_EXPRESSION: &str = "{version: process.version, release: process.release}";

/// Identity reported by a runtime (`process.version` and `process.release`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeIdentity {
    /// Release name, e.g. `node`
    pub release_name: String,
    /// Version as reported, e.g. `v20.11.0`
    pub version: String,
    /// Headers archive URL
    pub headers_url: Option<String>,
    /// Import library URL (Windows only)
    pub lib_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProcessDescriptor {
    version: Option<String>,
    release: Option<ReleaseDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseDescriptor {
    name: Option<String>,
    headers_url: Option<String>,
    lib_url: Option<String>,
}

impl RuntimeIdentity {
    /// Build an identity from explicit values, validating them like runtime output.
    pub fn new(release_name: &str, version: &str) -> Result<Self, AcquireError> {
        let identity = Self {
            release_name: release_name.to_string(),
            version: version.to_string(),
            headers_url: None,
            lib_url: None,
        };
        identity.validate("<explicit>")?;
        Ok(identity)
    }

    /// Parse the JSON a runtime printed for its version and release descriptor.
    pub fn from_json(executable: &str, output: &str) -> Result<Self, AcquireError> {
        let descriptor: ProcessDescriptor = serde_json::from_str(output.trim()).map_err(|e| {
            AcquireError::identity(executable, format!("malformed identity JSON: {e}"))
        })?;

        let version = descriptor
            .version
            .ok_or_else(|| AcquireError::identity(executable, "identity is missing `version`"))?;
        let release = descriptor
            .release
            .ok_or_else(|| AcquireError::identity(executable, "identity is missing `release`"))?;
        let release_name = release.name.ok_or_else(|| {
            AcquireError::identity(executable, "identity is missing `release.name`")
        })?;

        let identity = Self {
            release_name,
            version,
            headers_url: release.headers_url,
            lib_url: release.lib_url,
        };
        identity.validate(executable)?;
        Ok(identity)
    }

    /// Semantic version without the leading `v`
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(self.version.trim_start_matches('v')).ok()
    }

    /// Both values end up as cache path segments, so they must be plain names.
    pub(crate) fn validate(&self, executable: &str) -> Result<(), AcquireError> {
        if !is_single_component(&self.release_name) {
            return Err(AcquireError::identity(
                executable,
                format!("invalid release name `{}`", self.release_name),
            ));
        }
        if !is_single_component(&self.version) || self.semver().is_none() {
            return Err(AcquireError::identity(
                executable,
                format!("invalid version `{}`", self.version),
            ));
        }
        Ok(())
    }
}

fn is_single_component(value: &str) -> bool {
    let mut components = Path::new(value).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !value.contains(['/', '\\'])
}

/// Paths exposed by the `emnapi` package for WebAssembly builds
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmnapiPackage {
    /// C sources to compile into the module
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Header directory
    pub include_dir: PathBuf,
    /// JavaScript library passed to the linker
    pub js_library: PathBuf,
}

/// A runtime executable and the directory it is evaluated in
#[derive(Debug, Clone)]
pub struct Runtime {
    executable: String,
    working_dir: Option<PathBuf>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(DEFAULT_NODE)
    }
}

impl Runtime {
    /// Use `executable` (a name looked up in `PATH`, or a path)
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            working_dir: None,
        }
    }

    /// Evaluate expressions from `dir` (module resolution depends on it)
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Executable name or path
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Query the runtime for its identity.
    ///
    /// # Errors
    ///
    /// `RuntimeNotFound` if the executable cannot be started, `IdentityParseError`
    /// if it fails or prints something that is not a valid identity.
    pub fn identify(&self) -> Result<RuntimeIdentity, AcquireError> {
        let output = self.evaluate(IDENTITY_EXPRESSION)?;
        let identity = RuntimeIdentity::from_json(&self.executable, &output)?;
        tracing::debug!(
            release = %identity.release_name,
            version = %identity.version,
            "Identified runtime"
        );
        Ok(identity)
    }

    /// Resolve the `emnapi` package from the working directory.
    pub fn emnapi_package(&self) -> Result<EmnapiPackage, AcquireError> {
        self.evaluate_json(r#"require("emnapi")"#)
    }

    /// Evaluate `expression` and deserialize its JSON form.
    pub fn evaluate_json<T: DeserializeOwned>(&self, expression: &str) -> Result<T, AcquireError> {
        let output = self.evaluate(expression)?;
        serde_json::from_str(output.trim()).map_err(|e| {
            AcquireError::identity(
                &self.executable,
                format!("`{expression}` printed malformed JSON: {e}"),
            )
        })
    }

    fn evaluate(&self, expression: &str) -> Result<String, AcquireError> {
        let script = format!("JSON.stringify({expression})");
        tracing::debug!(executable = %self.executable, %script, "Spawning runtime");

        let mut command = Command::new(&self.executable);
        command.arg("-p").arg(&script);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|source| AcquireError::RuntimeNotFound {
                executable: self.executable.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquireError::identity(
                &self.executable,
                format!("`{expression}` exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        String::from_utf8(output.stdout).map_err(|_| {
            AcquireError::identity(&self.executable, format!("`{expression}` output is not UTF-8"))
        })
    }
}
