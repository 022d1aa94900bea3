//! core::config::schema
//!
//! TOML sections of the wikistore config file.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the index page must survive wikification, the
//! attachment directory must be a single path segment).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::naming::Namer;

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [repository]
/// path = "/srv/wiki"
/// files_dir = "files"
/// git_binary = "git"
/// timeout_secs = 30
///
/// [pages]
/// index = "Home"
/// items_per_page = 10
/// lowercase = false
///
/// [server]
/// proxy_path = "/wiki-app"
///
/// [resolution]
/// tie_break = "first"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WikiConfig {
    /// Storage repository settings
    pub repository: Option<RepositoryConfig>,

    /// Page naming and listing
    pub pages: Option<PagesConfig>,

    /// Locator settings for the presentation layer
    pub server: Option<ServerConfig>,

    /// Name resolution policy
    pub resolution: Option<ResolutionConfig>,
}

impl WikiConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(repository) = &self.repository {
            repository.validate()?;
        }
        if let Some(pages) = &self.pages {
            pages.validate()?;
        }
        if let Some(server) = &self.server {
            server.validate()?;
        }
        Ok(())
    }
}

/// `[repository]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Storage root (a git work tree or a directory inside one)
    pub path: Option<PathBuf>,

    /// Attachment directory name under the root
    pub files_dir: Option<String>,

    /// Git executable
    pub git_binary: Option<String>,

    /// Upper bound for a single git invocation, in seconds
    pub timeout_secs: Option<u64>,
}

impl RepositoryConfig {
    /// Validate the repository section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.files_dir {
            if dir.is_empty() || dir.contains('/') || dir.contains('\\') || dir == ".." {
                return Err(ConfigError::InvalidValue(format!(
                    "files_dir '{}' must be a single directory name",
                    dir
                )));
            }
        }

        if let Some(binary) = &self.git_binary {
            if binary.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "git_binary cannot be empty".to_string(),
                ));
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// `[pages]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PagesConfig {
    /// Name of the landing page
    pub index: Option<String>,

    /// Page size for the catalog listing
    pub items_per_page: Option<usize>,

    /// Lowercase storage names
    pub lowercase: Option<bool>,
}

impl PagesConfig {
    /// Validate the pages section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(index) = &self.index {
            let namer = Namer::new(self.lowercase.unwrap_or(false));
            if namer.wikify(index).is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "index page '{}' has no usable characters",
                    index
                )));
            }
        }

        if self.items_per_page == Some(0) {
            return Err(ConfigError::InvalidValue(
                "items_per_page must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Prefix prepended to every derived URL (reverse proxy mount point)
    pub proxy_path: Option<String>,
}

impl ServerConfig {
    /// Validate the server section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.proxy_path {
            if !prefix.is_empty() && !prefix.starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "proxy_path '{}' must be empty or start with '/'",
                    prefix
                )));
            }
        }
        Ok(())
    }
}

/// `[resolution]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ResolutionConfig {
    /// What to do when a base-name search finds several objects
    pub tie_break: Option<TieBreak>,
}

/// Policy for base-name searches that find more than one candidate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Take the top-ranked candidate (shallowest, then lexicographic).
    #[default]
    First,
    /// Refuse to choose; the lookup fails as ambiguous.
    Reject,
}
