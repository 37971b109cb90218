//! Configuration file management
//!
//! Reads hadron's TOML configuration from project and user locations and
//! layers it under environment variables and command-line flags.

use crate::addon::AddonOptions;
use crate::download::DEFAULT_TIMEOUT_SECS;
use crate::env_vars;
use crate::runtime::DEFAULT_NODE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".hadron.toml";

/// Application configuration loaded from TOML files
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Node.js executable to introspect
    #[serde(default)]
    pub node: Option<String>,

    /// Cache root replacing the platform default
    #[serde(default)]
    pub cache_dir: Option<String>,

    /// HTTP timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Defaults for `hadron flags`
    #[serde(default)]
    pub addon: AddonOptions,
}

impl Config {
    /// Load configuration from TOML files.
    /// Priority: ./.hadron.toml -> ~/.config/hadron/config.toml
    ///
    /// # Errors
    ///
    /// Returns an error if config file parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_with_options(None, false)
    }

    /// Load configuration with custom options.
    ///
    /// # Arguments
    /// * `custom_path` - Optional custom path to config file (overrides defaults)
    /// * `skip_rc` - If true, skip loading config files (return default config)
    ///
    /// # Errors
    ///
    /// Returns an error if the custom file cannot be read, or if any config
    /// file that exists fails to parse.
    pub fn load_with_options(custom_path: Option<&Path>, skip_rc: bool) -> Result<Self> {
        if skip_rc {
            return Ok(Self::default());
        }

        if let Some(path) = custom_path {
            return Self::load_from(path);
        }

        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::load_from(local);
        }

        if let Some(config_dir) = Self::user_config_dir() {
            let config_path = config_dir.join("config.toml");
            if config_path.is_file() {
                return Self::load_from(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Load a single config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or not valid config TOML.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/hadron`, falling back to `~/.config/hadron`
    #[must_use]
    pub fn user_config_dir() -> Option<PathBuf> {
        if let Some(xdg_config) = env_vars::lookup("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join("hadron"));
        }

        dirs::home_dir().map(|home| home.join(".config").join("hadron"))
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub node: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

/// Values taken from `HADRON_*` environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub node: Option<String>,
    pub cache_dir: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl EnvOverrides {
    /// Read the overrides from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            node: env_vars::node_executable(),
            cache_dir: env_vars::cache_dir(),
            timeout_secs: env_vars::timeout_secs(),
        }
    }
}

/// Effective settings after layering flag > environment > file > default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub node: String,
    /// `None` means the platform default location
    pub cache_root: Option<PathBuf>,
    pub timeout: Duration,
    pub addon: AddonOptions,
}

impl Settings {
    /// Resolve settings from the process environment.
    #[must_use]
    pub fn resolve(config: Config, cli: CliOverrides) -> Self {
        Self::resolve_with(config, cli, EnvOverrides::from_env())
    }

    #[must_use]
    pub fn resolve_with(config: Config, cli: CliOverrides, env: EnvOverrides) -> Self {
        let node = cli
            .node
            .or(env.node)
            .or(config.node)
            .unwrap_or_else(|| DEFAULT_NODE.to_string());

        let cache_root = cli
            .cache_dir
            .or_else(|| env.cache_dir.or(config.cache_dir).map(PathBuf::from));

        let timeout_secs = env
            .timeout_secs
            .or(config.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            node,
            cache_root,
            timeout: Duration::from_secs(timeout_secs),
            addon: config.addon,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests can panic")]
mod tests {
    use super::*;
    use crate::addon::Environment;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert!(config.node.is_none());
        assert!(config.cache_dir.is_none());
        assert!(config.timeout_secs.is_none());
        assert_eq!(config.addon, AddonOptions::default());
    }

    #[test]
    fn skip_rc_ignores_files() {
        let config =
            Config::load_with_options(Some(Path::new("/nonexistent.toml")), true).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn missing_custom_path_is_an_error() {
        let missing = Path::new("/nonexistent/hadron.toml");
        assert!(Config::load_with_options(Some(missing), false).is_err());
    }

    #[test]
    fn load_from_toml() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config_path = temp_dir.path().join(LOCAL_CONFIG_FILE);

        fs::write(
            &config_path,
            r#"
node = "/opt/node/bin/node"
cache_dir = "/custom/cache"
timeout_secs = 5

[addon]
async_pool = 8
environments = ["node", "worker"]
"#,
        )?;

        let config = Config::load_with_options(Some(&config_path), false)?;
        assert_eq!(config.node.as_deref(), Some("/opt/node/bin/node"));
        assert_eq!(config.cache_dir.as_deref(), Some("/custom/cache"));
        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.addon.async_pool, 8);
        assert!(config.addon.es6);
        assert_eq!(
            config.addon.environments.into_iter().collect::<Vec<_>>(),
            vec![Environment::Node, Environment::Worker]
        );
        Ok(())
    }

    #[test]
    fn unknown_keys_rejected() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "vendor_dir = \"x\"\n")?;

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
        Ok(())
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = Settings::resolve_with(
            Config::default(),
            CliOverrides::default(),
            EnvOverrides::default(),
        );
        assert_eq!(settings.node, "node");
        assert_eq!(settings.cache_root, None);
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }

    #[test]
    fn flag_beats_environment_beats_file() {
        let config = Config {
            node: Some("file-node".to_string()),
            cache_dir: Some("/file/cache".to_string()),
            timeout_secs: Some(10),
            ..Config::default()
        };
        let env = EnvOverrides {
            node: Some("env-node".to_string()),
            cache_dir: Some("/env/cache".to_string()),
            timeout_secs: None,
        };

        let cli = CliOverrides {
            node: Some("flag-node".to_string()),
            cache_dir: None,
        };
        let settings = Settings::resolve_with(config.clone(), cli, env.clone());
        assert_eq!(settings.node, "flag-node");
        assert_eq!(settings.cache_root, Some(PathBuf::from("/env/cache")));
        assert_eq!(settings.timeout, Duration::from_secs(10));

        let cli = CliOverrides {
            node: None,
            cache_dir: Some(PathBuf::from("/flag/cache")),
        };
        let settings = Settings::resolve_with(config, cli, env);
        assert_eq!(settings.node, "env-node");
        assert_eq!(settings.cache_root, Some(PathBuf::from("/flag/cache")));
    }

    #[test]
    fn file_used_when_environment_empty() {
        let config = Config {
            node: Some("file-node".to_string()),
            cache_dir: Some("/file/cache".to_string()),
            ..Config::default()
        };
        let settings =
            Settings::resolve_with(config, CliOverrides::default(), EnvOverrides::default());
        assert_eq!(settings.node, "file-node");
        assert_eq!(settings.cache_root, Some(PathBuf::from("/file/cache")));
    }
}
