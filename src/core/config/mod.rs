//! core::config
//!
//! Where the wiki lives and how names are resolved, loaded from TOML.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. The first config file found (see below)
//! 3. CLI flags (`--root`, applied via [`Config::with_root`])
//!
//! # Config Locations
//!
//! Searched in order, first hit wins:
//! 1. Path given with `--config` (must exist)
//! 2. `$WIKISTORE_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/wikistore/config.toml`
//! 4. `~/.wikistore/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use wikistore::core::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//!
//! println!("Storage root: {}", config.repository_path().display());
//! println!("Index page: {}", config.index_page());
//! println!("Git timeout: {:?}", config.timeout());
//! ```

pub mod schema;

pub use schema::{
    PagesConfig, RepositoryConfig, ResolutionConfig, ServerConfig, TieBreak, WikiConfig,
};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "WIKISTORE_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Non-fatal problems noticed while locating a config file.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// A loaded configuration and the warnings collected on the way.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: WikiConfig,
    /// Path to the config file (if one was loaded)
    loaded_from: Option<PathBuf>,
    /// Storage root override from the command line
    root_override: Option<PathBuf>,
}

impl Config {
    /// Default git executable.
    pub const DEFAULT_GIT_BINARY: &'static str = "git";

    /// Default bound on a single git invocation.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default landing page.
    pub const DEFAULT_INDEX: &'static str = "Home";

    /// Default catalog page size.
    pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` is given but missing, or if a config
    /// file exists but cannot be parsed or fails validation. A missing
    /// config in the default locations is not an error.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Load with injected environment and home directory.
    fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::from_file(path, warnings);
        }

        if let Some(path) = env(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Self::from_file(&path, warnings);
            }
            warnings.push(ConfigWarning {
                message: format!("${} points to a missing file; ignoring it", CONFIG_ENV),
                path,
            });
        }

        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("wikistore/config.toml");
            if path.exists() {
                return Self::from_file(&path, warnings);
            }
        }

        if let Some(home) = home {
            let path = home.join(".wikistore/config.toml");
            if path.exists() {
                return Self::from_file(&path, warnings);
            }
        }

        Ok(ConfigLoadResult {
            config: Config::default(),
            warnings,
        })
    }

    fn from_file(
        path: &Path,
        warnings: Vec<ConfigWarning>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let file = Self::read_config(path)?;
        file.validate()?;

        Ok(ConfigLoadResult {
            config: Config {
                file,
                loaded_from: Some(path.to_path_buf()),
                root_override: None,
            },
            warnings,
        })
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<WikiConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Override the storage root (the `--root` flag).
    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        if root.is_some() {
            self.root_override = root;
        }
        self
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    fn repository(&self) -> Option<&RepositoryConfig> {
        self.file.repository.as_ref()
    }

    fn pages(&self) -> Option<&PagesConfig> {
        self.file.pages.as_ref()
    }

    /// Storage root.
    ///
    /// Defaults to the current directory if neither flag nor file sets it.
    pub fn repository_path(&self) -> PathBuf {
        self.root_override
            .clone()
            .or_else(|| self.repository().and_then(|r| r.path.clone()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Attachment directory name.
    ///
    /// Defaults to `files`.
    pub fn files_dir(&self) -> &str {
        self.repository()
            .and_then(|r| r.files_dir.as_deref())
            .unwrap_or(crate::core::paths::StoragePaths::DEFAULT_FILES_DIR)
    }

    /// Git executable.
    ///
    /// Defaults to `git` on `PATH`.
    pub fn git_binary(&self) -> &str {
        self.repository()
            .and_then(|r| r.git_binary.as_deref())
            .unwrap_or(Self::DEFAULT_GIT_BINARY)
    }

    /// Bound on a single git invocation.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.repository()
                .and_then(|r| r.timeout_secs)
                .unwrap_or(Self::DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Landing page name.
    ///
    /// Defaults to `Home`.
    pub fn index_page(&self) -> &str {
        self.pages()
            .and_then(|p| p.index.as_deref())
            .unwrap_or(Self::DEFAULT_INDEX)
    }

    /// Catalog page size.
    ///
    /// Defaults to 10.
    pub fn items_per_page(&self) -> usize {
        self.pages()
            .and_then(|p| p.items_per_page)
            .unwrap_or(Self::DEFAULT_ITEMS_PER_PAGE)
    }

    /// Whether storage names are lowercased.
    ///
    /// Defaults to `false`.
    pub fn lowercase(&self) -> bool {
        self.pages().and_then(|p| p.lowercase).unwrap_or(false)
    }

    /// URL prefix for derived locators.
    ///
    /// Defaults to empty.
    pub fn proxy_path(&self) -> &str {
        self.file
            .server
            .as_ref()
            .and_then(|s| s.proxy_path.as_deref())
            .unwrap_or("")
    }

    /// Tie-break policy for base-name searches.
    pub fn tie_break(&self) -> TieBreak {
        self.file
            .resolution
            .as_ref()
            .and_then(|r| r.tie_break)
            .unwrap_or_default()
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn load_empty_defaults() {
        let home = TempDir::new().unwrap();
        let result = Config::load_with(None, no_env, Some(home.path().to_path_buf())).unwrap();
        let config = result.config;

        assert!(config.loaded_from().is_none());
        assert_eq!(config.repository_path(), PathBuf::from("."));
        assert_eq!(config.files_dir(), "files");
        assert_eq!(config.git_binary(), "git");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.index_page(), "Home");
        assert_eq!(config.items_per_page(), 10);
        assert!(!config.lowercase());
        assert_eq!(config.proxy_path(), "");
        assert_eq!(config.tie_break(), TieBreak::First);
    }

    #[test]
    fn load_from_env() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "[pages]\nindex = \"Start\"\n").unwrap();

        let path_str = config_path.to_str().unwrap().to_string();
        let env = move |key: &str| (key == CONFIG_ENV).then(|| path_str.clone());

        let result = Config::load_with(None, env, None).unwrap();
        assert_eq!(result.config.index_page(), "Start");
        assert_eq!(result.config.loaded_from(), Some(config_path.as_path()));
    }

    #[test]
    fn missing_env_file_warns_and_falls_through() {
        let env = |key: &str| (key == CONFIG_ENV).then(|| "/nonexistent/wikistore.toml".to_string());

        let result = Config::load_with(None, env, None).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains(CONFIG_ENV));
    }

    #[test]
    fn load_from_xdg() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("wikistore");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "[repository]\ntimeout_secs = 3\n").unwrap();

        let xdg = temp.path().to_str().unwrap().to_string();
        let env = move |key: &str| (key == "XDG_CONFIG_HOME").then(|| xdg.clone());

        let result = Config::load_with(None, env, None).unwrap();
        assert_eq!(result.config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn load_from_home() {
        let home = TempDir::new().unwrap();
        let dir = home.path().join(".wikistore");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "[server]\nproxy_path = \"/kb\"\n").unwrap();

        let result = Config::load_with(None, no_env, Some(home.path().to_path_buf())).unwrap();
        assert_eq!(result.config.proxy_path(), "/kb");
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = Config::load_with(Some(Path::new("/nonexistent.toml")), no_env, None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn explicit_path_wins_over_env() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("explicit.toml");
        let from_env = temp.path().join("env.toml");
        fs::write(&explicit, "[pages]\nindex = \"Explicit\"\n").unwrap();
        fs::write(&from_env, "[pages]\nindex = \"Env\"\n").unwrap();

        let env_path = from_env.to_str().unwrap().to_string();
        let env = move |key: &str| (key == CONFIG_ENV).then(|| env_path.clone());

        let result = Config::load_with(Some(&explicit), env, None).unwrap();
        assert_eq!(result.config.index_page(), "Explicit");
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[pages]\nitems_per_page = 0\n").unwrap();

        let result = Config::load_with(Some(&path), no_env, None);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn parse_errors_carry_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[pages\n").unwrap();

        match Config::load_with(Some(&path), no_env, None) {
            Err(ConfigError::ParseError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn root_override_beats_file() {
        let config = Config {
            file: WikiConfig {
                repository: Some(RepositoryConfig {
                    path: Some(PathBuf::from("/from/file")),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.repository_path(), PathBuf::from("/from/file"));

        let config = config.with_root(Some(PathBuf::from("/from/flag")));
        assert_eq!(config.repository_path(), PathBuf::from("/from/flag"));
    }

    #[test]
    fn with_root_none_keeps_existing() {
        let config = Config::default().with_root(Some(PathBuf::from("/a")));
        let config = config.with_root(None);
        assert_eq!(config.repository_path(), PathBuf::from("/a"));
    }
}
