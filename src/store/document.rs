//! store::document
//!
//! Request-scoped wiki documents (pages and attached files).
//!
//! # Lifecycle
//!
//! A [`Document`] is created by [`Wiki`](super::Wiki) from a raw name and a
//! revision. Resolution runs immediately (filesystem only), so
//! [`Document::exists`] needs no I/O afterwards. [`Document::fetch`] pulls
//! content and recent versions from the backend and records the outcome in
//! [`DocumentState`]; it does not fail for missing or broken documents.
//! History and comparisons require a successful fetch first.
//!
//! # Case retry
//!
//! On a case-insensitive filesystem a name can resolve to a file that git
//! knows under a different case. Git then reports the path as present on
//! disk but absent from the revision. Fetching handles this with one retry:
//!
//! 1. fetch under the name as given
//! 2. on that specific report, rename to the name with its first character
//!    capitalized and fetch once more
//! 3. any other outcome is final; a second mismatch is `NotFound`

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::diff::{self, DiffLine};
use super::locator::Action;
use super::resolver::{NameResolver, ResolveError, Resolution, Scope};
use super::revision::{RevisionStore, Snapshot, StoreError};
use super::wiki::Wiki;
use crate::core::naming::capitalize_first;
use crate::core::paths::StoragePaths;
use crate::core::types::{Revision, RevisionRange, VersionId};
use crate::git::{BackendError, HistoryEntry};

/// Why a name could not be narrowed down to one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Ambiguity {
    /// The name points at a directory and no file was found in its place.
    Directory { path: PathBuf },
    /// Several objects share the base name and the tie-break refused to
    /// pick one.
    Candidates { paths: Vec<PathBuf> },
}

impl std::fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ambiguity::Directory { path } => write!(f, "{} is a directory", path.display()),
            Ambiguity::Candidates { paths } => {
                let paths: Vec<_> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(f, "{} candidates ({})", paths.len(), paths.join(", "))
            }
        }
    }
}

/// Document-level failures, recorded in [`DocumentState::Failed`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// Nothing by this name at this revision.
    #[error("'{name}' not found at {revision}")]
    NotFound { name: String, revision: Revision },

    /// The name does not identify a single object.
    #[error("'{name}' is ambiguous: {ambiguity}")]
    Ambiguous { name: String, ambiguity: Ambiguity },

    /// The backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// History and comparisons need a successful fetch first.
    #[error("'{name}' has not been fetched")]
    NotFetched { name: String },
}

/// Page or attached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Page,
    File,
}

/// Outcome of fetching a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DocumentState {
    #[default]
    Unfetched,
    Ok {
        content: Vec<u8>,
        /// Newest first, at most two, as of the fetched revision
        hashes: Vec<VersionId>,
        /// Newest version at `HEAD`
        latest: Option<VersionId>,
    },
    Failed {
        reason: DocumentError,
    },
}

/// A diff between two versions of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub range: RevisionRange,
    pub lines: Vec<DiffLine>,
}

/// Steps of the case retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseStep {
    AsGiven,
    Capitalized,
}

/// A page or file, resolved against the storage tree.
#[derive(Debug)]
pub struct Document {
    wiki: Wiki,
    kind: DocumentKind,
    resolver: NameResolver,
    name: String,
    revision: Revision,
    resolution: Resolution,
    state: DocumentState,
}

impl Document {
    pub(crate) fn new(
        wiki: Wiki,
        kind: DocumentKind,
        scope: Scope,
        name: &str,
        revision: Revision,
    ) -> Result<Self, ResolveError> {
        let resolver = wiki.resolver(scope);
        let resolution = resolver.resolve(name)?;
        Ok(Self {
            wiki,
            kind,
            resolver,
            name: name.to_string(),
            revision,
            resolution,
            state: DocumentState::Unfetched,
        })
    }

    /// A document that resolves to nothing, whatever its name.
    pub(crate) fn rejected(
        wiki: Wiki,
        kind: DocumentKind,
        scope: Scope,
        name: &str,
        revision: Revision,
    ) -> Self {
        let resolver = wiki.resolver(scope);
        Self {
            wiki,
            kind,
            resolver,
            name: name.to_string(),
            revision,
            resolution: Resolution::missing(name),
            state: DocumentState::Unfetched,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The name as supplied (or as last renamed).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn revision(&self) -> &Revision {
        &self.revision
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Storage-relative path, once resolution succeeded.
    pub fn canonical_path(&self) -> Option<&Path> {
        self.resolution.path.as_deref()
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    /// Whether the name resolves to a stored object. Filesystem only.
    pub fn exists(&self) -> bool {
        self.resolution.exists()
    }

    /// Content of a successful fetch.
    pub fn content(&self) -> Option<&[u8]> {
        match &self.state {
            DocumentState::Ok { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Recent versions of a successful fetch; empty otherwise.
    pub fn hashes(&self) -> &[VersionId] {
        match &self.state {
            DocumentState::Ok { hashes, .. } => hashes,
            _ => &[],
        }
    }

    /// Newest version of the document at `HEAD`, after a successful fetch.
    pub fn latest_version(&self) -> Option<&VersionId> {
        match &self.state {
            DocumentState::Ok { latest, .. } => latest.as_ref(),
            _ => None,
        }
    }

    /// The failure of the last fetch.
    pub fn error(&self) -> Option<&DocumentError> {
        match &self.state {
            DocumentState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.state, DocumentState::Ok { .. })
    }

    /// Size of the fetched content in bytes.
    pub fn size(&self) -> Option<usize> {
        self.content().map(<[u8]>::len)
    }

    /// Rename and resolve again.
    ///
    /// Any earlier fetch result is discarded.
    pub fn set_names(&mut self, name: &str) -> Result<(), ResolveError> {
        self.resolution = self.resolver.resolve(name)?;
        self.name = name.to_string();
        self.state = DocumentState::Unfetched;
        Ok(())
    }

    /// Fetch content and recent versions, recording the outcome.
    ///
    /// # Errors
    ///
    /// Only [`ResolveError`] from the case retry's re-resolution. Missing
    /// documents and backend failures end up in [`Document::state`].
    pub async fn fetch(&mut self) -> Result<&DocumentState, ResolveError> {
        let mut step = CaseStep::AsGiven;

        self.state = loop {
            match self.attempt().await {
                Ok(snapshot) => {
                    break DocumentState::Ok {
                        content: snapshot.content,
                        hashes: snapshot.hashes,
                        latest: snapshot.latest,
                    }
                }
                Err(Attempt::Failed(reason)) => break DocumentState::Failed { reason },
                Err(Attempt::CaseMismatch) => {
                    let capitalized = capitalize_first(&self.name);
                    if step == CaseStep::Capitalized || capitalized == self.name {
                        break DocumentState::Failed {
                            reason: self.not_found(),
                        };
                    }

                    warn!(
                        name = %self.name,
                        retry = %capitalized,
                        "name not in revision under this case, retrying"
                    );
                    self.set_names(&capitalized)?;
                    step = CaseStep::Capitalized;
                }
            }
        };

        Ok(&self.state)
    }

    async fn attempt(&self) -> Result<Snapshot, Attempt> {
        let path = match &self.resolution.path {
            Some(path) => path.clone(),
            None => return Err(Attempt::Failed(self.unresolved())),
        };

        debug!(name = %self.name, path = %path.display(), "fetching document");
        RevisionStore::new(path, self.wiki.backend())
            .fetch_current(&self.revision)
            .await
            .map_err(|e| match e {
                StoreError::NotInRevision { .. } => Attempt::CaseMismatch,
                StoreError::NotFound { .. } => Attempt::Failed(self.not_found()),
                StoreError::Backend(e) => Attempt::Failed(DocumentError::Backend(e)),
            })
    }

    fn unresolved(&self) -> DocumentError {
        let name = self.name.clone();
        if self.resolution.is_ambiguous() {
            return DocumentError::Ambiguous {
                name,
                ambiguity: Ambiguity::Candidates {
                    paths: self
                        .resolution
                        .candidates
                        .iter()
                        .map(|c| c.path.clone())
                        .collect(),
                },
            };
        }
        if self.resolution.directory {
            return DocumentError::Ambiguous {
                name,
                ambiguity: Ambiguity::Directory {
                    path: PathBuf::from(&self.resolution.requested),
                },
            };
        }
        self.not_found()
    }

    fn not_found(&self) -> DocumentError {
        DocumentError::NotFound {
            name: self.name.clone(),
            revision: self.revision.clone(),
        }
    }

    fn store(&self) -> Result<RevisionStore, DocumentError> {
        match (&self.state, &self.resolution.path) {
            (DocumentState::Ok { .. }, Some(path)) => {
                Ok(RevisionStore::new(path.clone(), self.wiki.backend()))
            }
            _ => Err(DocumentError::NotFetched {
                name: self.name.clone(),
            }),
        }
    }

    /// Full history, newest first.
    pub async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, DocumentError> {
        self.store()?
            .fetch_history()
            .await
            .map_err(|e| self.store_error(e))
    }

    /// Compare two versions of this document.
    pub async fn fetch_revisions_diff(
        &self,
        range: &RevisionRange,
    ) -> Result<Comparison, DocumentError> {
        let raw = self
            .store()?
            .fetch_diff(range)
            .await
            .map_err(|e| self.store_error(e))?;

        Ok(Comparison {
            range: range.clone(),
            lines: diff::parse(&raw),
        })
    }

    fn store_error(&self, err: StoreError) -> DocumentError {
        match err {
            StoreError::Backend(e) => DocumentError::Backend(e),
            StoreError::NotFound { .. } | StoreError::NotInRevision { .. } => self.not_found(),
        }
    }

    /// The name used in URLs: the stored page name, or the attachment path
    /// below the attachment directory.
    pub fn url_name(&self) -> String {
        let Some(path) = &self.resolution.path else {
            return match self.kind {
                DocumentKind::Page => self.wiki.namer().wikify(&self.name),
                DocumentKind::File => self.name.clone(),
            };
        };

        match self.kind {
            DocumentKind::Page => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            DocumentKind::File => {
                let files_dir = Path::new(self.wiki.paths().files_dir_name());
                let below = path.strip_prefix(files_dir).unwrap_or(path);
                StoragePaths::git_path(below)
            }
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> String {
        match self.kind {
            DocumentKind::Page => self.wiki.namer().unwikify(&self.url_name()),
            DocumentKind::File => self
                .canonical_path()
                .and_then(Path::file_name)
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.name.clone()),
        }
    }

    /// Whether this is the configured landing page.
    pub fn is_index(&self) -> bool {
        self.kind == DocumentKind::Page
            && self.url_name() == self.wiki.namer().wikify(self.wiki.index_page())
    }

    /// Whether readers see the newest version: the revision is current, or
    /// it names the newest version of this document at `HEAD`.
    pub fn is_latest_revision(&self) -> bool {
        match &self.revision {
            Revision::Current => true,
            Revision::Version(id) => self.latest_version().is_some_and(|h| h.matches(id)),
        }
    }

    /// Canonical show URL.
    pub fn url_for_show(&self) -> String {
        self.wiki.locator().show(&self.url_name(), &self.revision)
    }

    /// URL for a presentation-layer action.
    pub fn url_for(&self, action: Action) -> String {
        self.wiki
            .locator()
            .url_for(&self.url_name(), action, &self.revision)
    }
}

enum Attempt {
    CaseMismatch,
    Failed(DocumentError),
}
