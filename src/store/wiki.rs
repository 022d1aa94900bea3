//! store::wiki
//!
//! The process-wide wiki handle.
//!
//! `Wiki` holds what every request shares: storage paths, the backend
//! client and naming/locator settings. It is cheap to clone and is the only
//! way to create [`Document`]s, so the backend always arrives by injection.
//!
//! # Example
//!
//! ```no_run
//! use wikistore::core::config::Config;
//! use wikistore::core::types::Revision;
//! use wikistore::store::Wiki;
//!
//! # tokio_test::block_on(async {
//! let config = Config::load(None).unwrap().config;
//! let wiki = Wiki::open(&config).unwrap();
//!
//! let mut page = wiki.page("Home", Revision::Current).unwrap();
//! page.fetch().await.unwrap();
//! # });
//! ```

use std::sync::Arc;

use tracing::debug;

use super::catalog::Catalog;
use super::document::{Document, DocumentKind};
use super::locator::Locator;
use super::resolver::{NameResolver, ResolveError, Scope};
use crate::core::config::{Config, TieBreak};
use crate::core::naming::{normalize_segments, Namer};
use crate::core::paths::StoragePaths;
use crate::core::types::Revision;
use crate::git::{Backend, Git, GitCli, GitError};

/// Settings shared by every document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiSettings {
    pub lowercase: bool,
    pub proxy_path: String,
    pub index_page: String,
    pub tie_break: TieBreak,
    pub items_per_page: usize,
}

impl Default for WikiSettings {
    fn default() -> Self {
        Self {
            lowercase: false,
            proxy_path: String::new(),
            index_page: Config::DEFAULT_INDEX.to_string(),
            tie_break: TieBreak::default(),
            items_per_page: Config::DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl From<&Config> for WikiSettings {
    fn from(config: &Config) -> Self {
        Self {
            lowercase: config.lowercase(),
            proxy_path: config.proxy_path().to_string(),
            index_page: config.index_page().to_string(),
            tie_break: config.tie_break(),
            items_per_page: config.items_per_page(),
        }
    }
}

/// Shared, read-mostly wiki handle.
#[derive(Clone)]
pub struct Wiki {
    inner: Arc<WikiInner>,
}

struct WikiInner {
    paths: StoragePaths,
    backend: Arc<dyn Backend>,
    namer: Namer,
    locator: Locator,
    settings: WikiSettings,
}

impl std::fmt::Debug for Wiki {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wiki")
            .field("paths", &self.inner.paths)
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl Wiki {
    /// Create a wiki over an explicit backend.
    pub fn new(paths: StoragePaths, backend: Arc<dyn Backend>, settings: WikiSettings) -> Self {
        Self {
            inner: Arc::new(WikiInner {
                paths,
                backend,
                namer: Namer::new(settings.lowercase),
                locator: Locator::new(settings.proxy_path.clone()),
                settings,
            }),
        }
    }

    /// Open the wiki described by `config`, backed by the git CLI.
    ///
    /// # Errors
    ///
    /// Fails if the storage root is not inside a non-bare git work tree.
    pub fn open(config: &Config) -> Result<Self, GitError> {
        let root = config.repository_path();
        let git = Git::open(&root)?;
        let info = git.info()?;
        debug!(
            root = %root.display(),
            work_dir = %info.work_dir.display(),
            "opened wiki repository"
        );

        let backend = GitCli::new(root.clone())
            .program(config.git_binary())
            .timeout(config.timeout());

        Ok(Self::new(
            StoragePaths::new(root, config.files_dir()),
            Arc::new(backend),
            WikiSettings::from(config),
        ))
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.inner.paths
    }

    pub fn namer(&self) -> Namer {
        self.inner.namer
    }

    pub fn locator(&self) -> &Locator {
        &self.inner.locator
    }

    pub fn settings(&self) -> &WikiSettings {
        &self.inner.settings
    }

    pub fn index_page(&self) -> &str {
        &self.inner.settings.index_page
    }

    /// Shared backend handle.
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.inner.backend)
    }

    pub(crate) fn resolver(&self, scope: Scope) -> NameResolver {
        NameResolver::new(self.inner.paths.clone(), self.inner.namer, scope)
            .tie_break(self.inner.settings.tie_break)
    }

    /// A page at `revision`.
    pub fn page(&self, name: &str, revision: Revision) -> Result<Document, ResolveError> {
        Document::new(self.clone(), DocumentKind::Page, Scope::Pages, name, revision)
    }

    /// The configured landing page.
    pub fn index(&self) -> Result<Document, ResolveError> {
        self.page(self.index_page(), Revision::Current)
    }

    /// An attachment anywhere under the attachment directory.
    pub fn file(&self, name: &str) -> Result<Document, ResolveError> {
        self.file_at(name, Revision::Current)
    }

    /// An attachment at `revision`.
    pub fn file_at(&self, name: &str, revision: Revision) -> Result<Document, ResolveError> {
        Document::new(self.clone(), DocumentKind::File, Scope::files(), name, revision)
    }

    /// An attachment looked up only below `dir` inside the attachment
    /// directory.
    ///
    /// A blank `dir` means the whole attachment directory. A `dir` that
    /// climbs out with `..` matches nothing.
    pub fn file_in(&self, name: &str, dir: &str) -> Result<Document, ResolveError> {
        let subdir = match normalize_segments(dir) {
            Some(segments) => segments,
            None if climbs(dir) => {
                debug!(name, dir, "rejected attachment directory");
                return Ok(Document::rejected(
                    self.clone(),
                    DocumentKind::File,
                    Scope::files(),
                    name,
                    Revision::Current,
                ));
            }
            None => Vec::new(),
        };
        Document::new(
            self.clone(),
            DocumentKind::File,
            Scope::Files { subdir },
            name,
            Revision::Current,
        )
    }

    /// Listing of all pages.
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.clone())
    }
}

/// Whether a relative directory name steps above its base with `..`.
fn climbs(dir: &str) -> bool {
    dir.split(&['/', '\\'][..]).any(|segment| segment.trim() == "..")
}
