//! Flags command
//!
//! Print the include directories, sources and compiler/linker arguments for
//! building an addon against the cached headers

use super::Context;
use anyhow::{Context as _, Result};
use hadron::{AddonOptions, BuildFlags, Environment};
use std::env;
use std::path::PathBuf;

/// Addon build options; unset ones fall back to the `[addon]` config table
#[derive(Debug, Default, clap::Args)]
pub(crate) struct FlagsArgs {
    /// Build for WebAssembly with Emscripten and emnapi
    #[arg(long)]
    wasm: bool,

    /// Directory `emnapi` is resolved from (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    source_root: Option<PathBuf>,

    /// Run async work on pthreads
    #[arg(long)]
    async_workers: bool,

    /// Number of pthreads in the pool
    #[arg(long, value_name = "N")]
    async_pool: Option<u32>,

    /// Stack size, e.g. 2MB
    #[arg(long, value_name = "SIZE")]
    stack: Option<String>,

    /// Emit a plain script instead of an ES6 module
    #[arg(long)]
    no_es6: bool,

    /// Do not catch C++ exceptions
    #[arg(long)]
    no_exceptions: bool,

    /// The addon is generated by SWIG
    #[arg(long)]
    swig: bool,

    /// Add Emscripten's runtime checks
    #[arg(long)]
    debug_build: bool,

    /// Environment the module loads in (repeatable; default: all)
    #[arg(long = "environment", value_name = "ENV")]
    environments: Vec<Environment>,
}

impl FlagsArgs {
    /// Layer the flags over `base`
    fn apply(self, mut base: AddonOptions) -> AddonOptions {
        base.async_workers |= self.async_workers;
        if let Some(pool) = self.async_pool {
            base.async_pool = pool;
        }
        if let Some(stack) = self.stack {
            base.stack = stack;
        }
        base.es6 &= !self.no_es6;
        base.exceptions &= !self.no_exceptions;
        base.swig |= self.swig;
        base.debug |= self.debug_build;
        if !self.environments.is_empty() {
            base.environments = self.environments.into_iter().collect();
        }
        base
    }
}

/// Acquire the headers and print the build flags for addon `name` as JSON
pub(crate) async fn run(context: &Context, name: &str, args: FlagsArgs) -> Result<()> {
    let wasm = args.wasm;
    let source_root = match &args.source_root {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("Failed to determine current directory")?,
    };
    let options = args.apply(context.settings.addon.clone());

    let handle = context.acquire(false).await?;

    let flags = if wasm {
        let emnapi = context
            .runtime()
            .with_working_dir(&source_root)
            .emnapi_package()
            .context("Failed to resolve the emnapi package (is it installed?)")?;
        BuildFlags::emscripten(name, &handle, &options, &emnapi, &source_root)?
    } else {
        BuildFlags::native(&handle)
    };

    let output = serde_json::to_string_pretty(&flags).context("Failed to serialize flags")?;
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_keep_config() {
        let base = AddonOptions {
            async_pool: 8,
            ..AddonOptions::default()
        };
        assert_eq!(FlagsArgs::default().apply(base.clone()), base);
    }

    #[test]
    fn flags_override_config() {
        let args = FlagsArgs {
            async_workers: true,
            async_pool: Some(2),
            no_es6: true,
            debug_build: true,
            environments: vec![Environment::Web, Environment::Web],
            ..FlagsArgs::default()
        };
        let options = args.apply(AddonOptions::default());

        assert!(options.async_workers);
        assert_eq!(options.async_pool, 2);
        assert!(!options.es6);
        assert!(options.exceptions);
        assert!(options.debug);
        assert_eq!(
            options.environments.into_iter().collect::<Vec<_>>(),
            vec![Environment::Web]
        );
    }
}
