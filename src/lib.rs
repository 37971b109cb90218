//! Hadron internal library code
//!
//! Locates, downloads and caches the header distribution of the installed
//! Node.js runtime, and assembles compiler flags for native addons.

pub mod addon;
pub mod archive;
pub mod cache;
pub mod config;
pub mod download;
pub mod env_vars;
pub mod error;
pub mod logging;
pub mod platform;
pub mod runtime;
pub mod session;

// Re-export common types for convenience
pub use addon::{AddonOptions, BuildFlags, Environment, FlagsError, Toolchain};
pub use cache::{CacheEntry, Stats as CacheDirStats, collect_stats, human_bytes};
pub use config::{Config, Settings};
pub use download::{FetchOutcome, Fetcher, HttpTransport, Transport};
pub use error::AcquireError;
pub use logging::init_logging;
pub use platform::{CACHE_NAMESPACE, PlatformFamily};
pub use runtime::{EmnapiPackage, Runtime, RuntimeIdentity};
pub use session::RuntimeHandle;
