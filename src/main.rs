//! Hadron command-line interface
//!
//! Fetches Node.js headers for native addon builds

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use hadron::config::CliOverrides;
use std::path::PathBuf;
use std::process;

/// Display an error and its chain of causes
fn display_error(err: &anyhow::Error) {
    eprintln!("error: {err}");

    let mut source = err.source();
    while let Some(err) = source {
        eprintln!("caused by: {err}");
        source = err.source();
    }
}

#[derive(Parser)]
#[command(name = "hadron")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Node.js header cache for native addon builds", long_about = None)]
pub(crate) struct Cli {
    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Node.js executable to introspect
    #[arg(long, global = true, value_name = "PATH")]
    node: Option<String>,

    /// Cache root replacing the platform default
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Use this config file instead of the default locations
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long, global = true)]
    no_config: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the runtime's headers (and import library) into the cache
    Fetch {
        /// Only print the distribution directory
        #[arg(long, short)]
        quiet: bool,
    },

    /// Print the cache directory for a runtime
    Locate {
        /// Release name (defaults to the runtime's own)
        #[arg(long, requires = "runtime_version")]
        release_name: Option<String>,

        /// Runtime version, e.g. v20.11.0
        #[arg(long, requires = "release_name")]
        runtime_version: Option<String>,

        /// Operating system to locate for (defaults to the current one)
        #[arg(long, value_name = "OS")]
        platform: Option<String>,
    },

    /// Show the runtime identity
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print compiler and linker inputs for an addon as JSON
    Flags {
        /// Addon name
        name: String,

        #[command(flatten)]
        args: commands::flags::FlagsArgs,
    },

    /// List cached distributions
    Cache,

    /// Remove the current runtime's cached distribution
    Clean {
        /// Remove every cached distribution
        #[arg(long)]
        all: bool,
    },

    /// Show environment information for troubleshooting
    Env,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    hadron::init_logging(cli.debug);

    if let Err(e) = run(cli).await {
        display_error(&e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completion { shell } = cli.command {
        return commands::completion::run(shell);
    }

    let overrides = CliOverrides {
        node: cli.node,
        cache_dir: cli.cache_dir,
    };
    let context = commands::Context::load(cli.config.as_deref(), cli.no_config, overrides)?;

    match cli.command {
        Commands::Fetch { quiet } => commands::fetch::run(&context, quiet).await,
        Commands::Locate {
            release_name,
            runtime_version,
            platform,
        } => commands::locate::run(
            &context,
            release_name.as_deref().zip(runtime_version.as_deref()),
            platform.as_deref(),
        ),
        Commands::Info { json } => commands::info::run(&context, json),
        Commands::Flags { name, args } => commands::flags::run(&context, &name, args).await,
        Commands::Cache => commands::cache::run(&context),
        Commands::Clean { all } => commands::clean::run(&context, all),
        Commands::Env => {
            commands::env::run(&context);
            Ok(())
        }
        Commands::Completion { shell } => commands::completion::run(shell),
    }
}

mod commands;
