//! Addon build inputs
//!
//! Computes what a build system passes to the compiler and linker for a
//! Node-API addon: include directories, extra sources, flags and the output
//! file naming. Native builds only need the cached headers; WebAssembly
//! builds through Emscripten also pull in the `emnapi` package.

use crate::runtime::EmnapiPackage;
use crate::session::RuntimeHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output prefix for every addon (no `lib`)
pub const NAME_PREFIX: &str = "";
/// Output suffix for native addons
pub const NATIVE_SUFFIX: &str = "node";
/// Output suffix for WebAssembly addons
pub const WASM_SUFFIX: &str = "mjs";

const EXPORTED_FUNCTIONS: &str = r#"-sEXPORTED_FUNCTIONS=["_malloc","_free","_napi_register_wasm_v1","_node_api_module_get_api_version_v1"]"#;

const DEBUG_LINK_ARGS: &[&str] = &[
    "-gsource-map",
    "-sSAFE_HEAP=1",
    "-sASSERTIONS=2",
    "-sSTACK_OVERFLOW_CHECK=2",
];

/// JavaScript environments an Emscripten module can load in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Node,
    Web,
    Webview,
    Worker,
}

impl Environment {
    pub const ALL: [Self; 4] = [Self::Node, Self::Web, Self::Webview, Self::Worker];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Web => "web",
            Self::Webview => "webview",
            Self::Worker => "worker",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown environment `{s}` (expected node, web, webview or worker)")
            })
    }
}

/// Options for WebAssembly builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonOptions {
    /// Run async work on pthreads
    pub async_workers: bool,
    /// Size of the pthread pool when `async_workers` is set
    pub async_pool: u32,
    /// Emit an ES6 module
    pub es6: bool,
    /// Stack size, in Emscripten notation (`2MB`)
    pub stack: String,
    /// Allow C++ exceptions to be caught
    pub exceptions: bool,
    /// Module is generated by SWIG (needs exception catching)
    pub swig: bool,
    /// Add Emscripten's runtime checks
    pub debug: bool,
    /// Environments the module may load in
    pub environments: BTreeSet<Environment>,
}

impl Default for AddonOptions {
    fn default() -> Self {
        Self {
            async_workers: false,
            async_pool: 4,
            es6: true,
            stack: "2MB".to_string(),
            exceptions: true,
            swig: false,
            debug: false,
            environments: Environment::ALL.into_iter().collect(),
        }
    }
}

/// How the addon is compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    Native,
    Emscripten,
}

/// Inputs for one addon target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFlags {
    pub toolchain: Toolchain,
    pub name_prefix: String,
    pub name_suffix: String,
    pub include_dirs: Vec<PathBuf>,
    pub sources: Vec<PathBuf>,
    pub c_args: Vec<String>,
    pub cpp_args: Vec<String>,
    pub link_args: Vec<String>,
}

/// Invalid option combinations
#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum FlagsError {
    #[error("at least one environment is required")]
    NoEnvironment,
}

impl BuildFlags {
    fn base(toolchain: Toolchain, suffix: &str) -> Self {
        Self {
            toolchain,
            name_prefix: NAME_PREFIX.to_string(),
            name_suffix: suffix.to_string(),
            include_dirs: Vec::new(),
            sources: Vec::new(),
            c_args: Vec::new(),
            cpp_args: Vec::new(),
            link_args: Vec::new(),
        }
    }

    /// Flags for a native addon loaded by Node.js
    #[must_use]
    pub fn native(handle: &RuntimeHandle) -> Self {
        let mut flags = Self::base(Toolchain::Native, NATIVE_SUFFIX);
        flags.push_common_includes(handle);
        flags
    }

    /// Flags for an Emscripten build of addon `name`.
    ///
    /// `emnapi` paths inside `source_root` are made relative to it.
    pub fn emscripten(
        name: &str,
        handle: &RuntimeHandle,
        options: &AddonOptions,
        emnapi: &EmnapiPackage,
        source_root: &Path,
    ) -> Result<Self, FlagsError> {
        if options.environments.is_empty() {
            return Err(FlagsError::NoEnvironment);
        }

        let mut flags = Self::base(Toolchain::Emscripten, WASM_SUFFIX);
        let (c_args, mut link_args) = emscripten_args(name, options);
        flags.cpp_args.clone_from(&c_args);
        flags.c_args = c_args;

        link_args.push(format!("--js-library={}", emnapi.js_library.display()));
        flags.link_args = link_args;

        flags
            .include_dirs
            .push(relativize(&emnapi.include_dir, source_root));
        flags.sources = emnapi
            .sources
            .iter()
            .map(|source| relativize(source, source_root))
            .collect();

        flags.push_common_includes(handle);
        Ok(flags)
    }

    fn push_common_includes(&mut self, handle: &RuntimeHandle) {
        self.include_dirs.push(handle.include_dir());
        self.include_dirs
            .push(Path::new("node_modules").join("node-addon-api"));
    }
}

/// Compile and link arguments every emnapi module needs, plus those selected by `options`
#[must_use]
pub fn emscripten_args(name: &str, options: &AddonOptions) -> (Vec<String>, Vec<String>) {
    let mut c_args = Vec::new();
    let mut link_args: Vec<String> = [
        "-Wno-emcc",
        "-Wno-pthreads-mem-growth",
        "-sALLOW_MEMORY_GROWTH=1",
        EXPORTED_FUNCTIONS,
        "--bind",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    link_args.push(format!("-sSTACK_SIZE={}", options.stack));

    if options.es6 {
        link_args.extend([
            "-sMODULARIZE".to_string(),
            "-sEXPORT_ES6=1".to_string(),
            format!("-sEXPORT_NAME={name}"),
        ]);
    }
    if options.async_workers {
        c_args.push("-pthread".to_string());
        link_args.extend([
            "-pthread".to_string(),
            format!("-sDEFAULT_PTHREAD_STACK_SIZE={}", options.stack),
            format!("-sPTHREAD_POOL_SIZE={}", options.async_pool),
        ]);
    }
    if options.exceptions || options.swig {
        link_args.push("-sNO_DISABLE_EXCEPTION_CATCHING".to_string());
    }
    if options.debug {
        link_args.extend(DEBUG_LINK_ARGS.iter().map(|arg| (*arg).to_string()));
    }

    let environments: Vec<&str> = options
        .environments
        .iter()
        .map(|env| env.as_str())
        .collect();
    link_args.push(format!("-sENVIRONMENT={}", environments.join(",")));

    (c_args, link_args)
}

/// `path` relative to `root` when it lies inside it, unchanged otherwise
#[must_use]
pub fn relativize(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;
    use crate::runtime::RuntimeIdentity;

    fn handle() -> RuntimeHandle {
        RuntimeHandle::new(
            RuntimeIdentity::new("node", "v20.11.0").unwrap(),
            PathBuf::from("/cache/node-hadron/node/v20.11.0"),
        )
    }

    fn emnapi() -> EmnapiPackage {
        EmnapiPackage {
            sources: vec![
                PathBuf::from("/proj/node_modules/emnapi/src/js_native_api.c"),
                PathBuf::from("/opt/shared/emnapi/src/uv.c"),
            ],
            include_dir: PathBuf::from("/proj/node_modules/emnapi/include/node"),
            js_library: PathBuf::from("/proj/node_modules/emnapi/dist/library_napi.js"),
        }
    }

    #[test]
    fn native_flags() {
        let flags = BuildFlags::native(&handle());
        assert_eq!(flags.name_prefix, "");
        assert_eq!(flags.name_suffix, "node");
        assert_eq!(
            flags.include_dirs,
            vec![
                PathBuf::from("/cache/node-hadron/node/v20.11.0/include/node"),
                PathBuf::from("node_modules/node-addon-api"),
            ]
        );
        assert!(flags.link_args.is_empty());
    }

    #[test]
    fn default_emscripten_args() {
        let (c_args, link_args) = emscripten_args("hello", &AddonOptions::default());
        assert!(c_args.is_empty());
        assert_eq!(link_args.first().map(String::as_str), Some("-Wno-emcc"));
        assert!(link_args.contains(&"-sSTACK_SIZE=2MB".to_string()));
        assert!(link_args.contains(&"-sEXPORT_NAME=hello".to_string()));
        assert!(link_args.contains(&"-sNO_DISABLE_EXCEPTION_CATCHING".to_string()));
        assert_eq!(
            link_args.last().map(String::as_str),
            Some("-sENVIRONMENT=node,web,webview,worker")
        );
        assert!(!link_args.iter().any(|arg| arg.contains("PTHREAD")));
    }

    #[test]
    fn async_workers_enable_pthreads() {
        let options = AddonOptions {
            async_workers: true,
            async_pool: 8,
            stack: "4MB".to_string(),
            ..AddonOptions::default()
        };
        let (c_args, link_args) = emscripten_args("hello", &options);
        assert_eq!(c_args, vec!["-pthread".to_string()]);
        assert!(link_args.contains(&"-sPTHREAD_POOL_SIZE=8".to_string()));
        assert!(link_args.contains(&"-sDEFAULT_PTHREAD_STACK_SIZE=4MB".to_string()));
    }

    #[test]
    fn swig_forces_exception_catching() {
        let options = AddonOptions {
            exceptions: false,
            swig: true,
            ..AddonOptions::default()
        };
        let (_, link_args) = emscripten_args("hello", &options);
        assert!(link_args.contains(&"-sNO_DISABLE_EXCEPTION_CATCHING".to_string()));

        let options = AddonOptions {
            exceptions: false,
            ..AddonOptions::default()
        };
        let (_, link_args) = emscripten_args("hello", &options);
        assert!(!link_args.contains(&"-sNO_DISABLE_EXCEPTION_CATCHING".to_string()));
    }

    #[test]
    fn es6_can_be_disabled() {
        let options = AddonOptions {
            es6: false,
            ..AddonOptions::default()
        };
        let (_, link_args) = emscripten_args("hello", &options);
        assert!(!link_args.iter().any(|arg| arg.starts_with("-sEXPORT_")));
    }

    #[test]
    fn debug_adds_runtime_checks() {
        let options = AddonOptions {
            debug: true,
            ..AddonOptions::default()
        };
        let (_, link_args) = emscripten_args("hello", &options);
        assert!(link_args.contains(&"-sSAFE_HEAP=1".to_string()));
    }

    #[test]
    fn environment_list_is_ordered() {
        let options = AddonOptions {
            environments: [Environment::Worker, Environment::Node].into_iter().collect(),
            ..AddonOptions::default()
        };
        let (_, link_args) = emscripten_args("hello", &options);
        assert_eq!(
            link_args.last().map(String::as_str),
            Some("-sENVIRONMENT=node,worker")
        );
    }

    #[test]
    fn emscripten_flags_use_emnapi() {
        let flags = BuildFlags::emscripten(
            "hello",
            &handle(),
            &AddonOptions::default(),
            &emnapi(),
            Path::new("/proj"),
        )
        .unwrap();

        assert_eq!(flags.name_suffix, "mjs");
        assert_eq!(
            flags.sources,
            vec![
                PathBuf::from("node_modules/emnapi/src/js_native_api.c"),
                PathBuf::from("/opt/shared/emnapi/src/uv.c"),
            ]
        );
        assert_eq!(
            flags.include_dirs.first(),
            Some(&PathBuf::from("node_modules/emnapi/include/node"))
        );
        assert!(
            flags.link_args.contains(
                &"--js-library=/proj/node_modules/emnapi/dist/library_napi.js".to_string()
            )
        );
        assert_eq!(flags.c_args, flags.cpp_args);
    }

    #[test]
    fn empty_environment_set_is_rejected() {
        let options = AddonOptions {
            environments: BTreeSet::new(),
            ..AddonOptions::default()
        };
        let err = BuildFlags::emscripten("hello", &handle(), &options, &emnapi(), Path::new("/"))
            .unwrap_err();
        assert!(matches!(err, FlagsError::NoEnvironment));
    }

    #[test]
    fn environment_from_str() {
        assert_eq!("Web".parse::<Environment>().unwrap(), Environment::Web);
        assert!("deno".parse::<Environment>().is_err());
    }

    #[test]
    fn options_from_toml() {
        let options: AddonOptions = toml::from_str(
            r#"
async_workers = true
environments = ["node", "worker"]
"#,
        )
        .unwrap();
        assert!(options.async_workers);
        assert_eq!(options.async_pool, 4);
        assert_eq!(options.environments.len(), 2);
    }
}
