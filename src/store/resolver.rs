//! store::resolver
//!
//! Logical name to storage path resolution.
//!
//! # Strategies
//!
//! Tried in order, first hit wins:
//!
//! 1. [`Strategy::Exact`]: the normalized name is a regular file in scope
//! 2. [`Strategy::TrailingSegment`]: the name is directory-shaped (it names
//!    a directory, or its first segment is one), so only its last segment
//!    is looked up at the top of the scope
//! 3. [`Strategy::BaseNameSearch`]: the whole scope is searched for the
//!    base file name; candidates are ranked shallowest first, then by path
//!
//! Nothing found is [`Strategy::Missing`], which is not an error.
//!
//! # Scopes
//!
//! - [`Scope::Pages`]: the storage root, names are wikified and get the
//!   `.md` extension, the attachment directory is not searched
//! - [`Scope::Files`]: the attachment directory (optionally a subdirectory
//!   of it), names are used as given
//!
//! Resolution only stats and walks the filesystem. Hidden entries are
//! skipped and `..` never escapes the scope.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::config::TieBreak;
use crate::core::naming::{normalize_segments, Namer};
use crate::core::paths::StoragePaths;

/// Errors that prevent resolution altogether.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The scope directory exists but cannot be read.
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What kind of object a name refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Wiki pages at the storage root.
    Pages,
    /// Attachments, optionally restricted to a subdirectory of the
    /// attachment directory.
    Files { subdir: Vec<String> },
}

impl Scope {
    /// Attachments anywhere under the attachment directory.
    pub fn files() -> Self {
        Scope::Files { subdir: Vec::new() }
    }
}

/// How a resolution was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Exact,
    TrailingSegment,
    BaseNameSearch,
    Missing,
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Storage-relative path
    pub path: PathBuf,
    /// Directory depth below the scope root
    pub depth: usize,
}

/// Result of resolving one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The name as requested
    pub requested: String,
    /// Storage-relative path, when something was found
    pub path: Option<PathBuf>,
    pub strategy: Strategy,
    /// The name itself points at a directory
    pub directory: bool,
    /// Ranked base-name search hits (empty unless a search ran)
    pub candidates: Vec<Candidate>,
}

impl Resolution {
    pub(crate) fn missing(requested: &str) -> Self {
        Self {
            requested: requested.to_string(),
            path: None,
            strategy: Strategy::Missing,
            directory: false,
            candidates: Vec::new(),
        }
    }

    /// Whether a stored object was found.
    pub fn exists(&self) -> bool {
        self.path.is_some()
    }

    /// A base-name search found more than one object.
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

/// Resolves names within one scope.
#[derive(Debug, Clone)]
pub struct NameResolver {
    paths: StoragePaths,
    namer: Namer,
    scope: Scope,
    tie_break: TieBreak,
}

impl NameResolver {
    /// Create a resolver for `scope`.
    pub fn new(paths: StoragePaths, namer: Namer, scope: Scope) -> Self {
        Self {
            paths,
            namer,
            scope,
            tie_break: TieBreak::default(),
        }
    }

    /// Choose what happens when a search finds several objects.
    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// The scope this resolver searches.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Storage-relative directory the scope covers.
    fn scope_dir(&self) -> PathBuf {
        match &self.scope {
            Scope::Pages => PathBuf::new(),
            Scope::Files { subdir } => self.paths.attachment(subdir),
        }
    }

    /// Storage file name for the final segment of a name.
    fn leaf_name(&self, segment: &str) -> String {
        match self.scope {
            Scope::Pages => StoragePaths::page_file(&self.namer.wikify(segment)),
            Scope::Files { .. } => segment.to_string(),
        }
    }

    fn is_file(&self, relative: &Path) -> bool {
        self.paths.absolute(relative).is_file()
    }

    fn is_dir(&self, relative: &Path) -> bool {
        self.paths.absolute(relative).is_dir()
    }

    /// Resolve a raw name.
    ///
    /// # Errors
    ///
    /// Only [`ResolveError::Unreadable`]; absence is a [`Strategy::Missing`]
    /// resolution.
    pub fn resolve(&self, raw: &str) -> Result<Resolution, ResolveError> {
        let Some(segments) = normalize_segments(raw) else {
            debug!(name = raw, "unusable name");
            return Ok(Resolution::missing(raw));
        };
        let Some((last, parents)) = segments.split_last() else {
            return Ok(Resolution::missing(raw));
        };

        let scope_dir = self.scope_dir();
        let leaf = self.leaf_name(last);
        if leaf.starts_with('.') {
            return Ok(Resolution::missing(raw));
        }

        let mut exact = scope_dir.clone();
        exact.extend(parents);
        exact.push(&leaf);

        let mut resolution = Resolution::missing(raw);

        if self.is_file(&exact) {
            resolution.path = Some(exact);
            resolution.strategy = Strategy::Exact;
            return Ok(resolution);
        }

        let mut named = scope_dir.clone();
        named.extend(&segments);
        resolution.directory = self.is_dir(&named);
        let first_is_dir = !parents.is_empty() && self.is_dir(&scope_dir.join(&segments[0]));

        if resolution.directory || first_is_dir {
            let trailing = scope_dir.join(&leaf);
            if self.is_file(&trailing) {
                debug!(name = raw, path = %trailing.display(), "resolved by trailing segment");
                resolution.path = Some(trailing);
                resolution.strategy = Strategy::TrailingSegment;
                return Ok(resolution);
            }
        }

        resolution.candidates = self.search(&scope_dir, &leaf)?;
        if resolution.candidates.is_empty() {
            return Ok(resolution);
        }

        resolution.strategy = Strategy::BaseNameSearch;
        if resolution.is_ambiguous() {
            match self.tie_break {
                TieBreak::First => {
                    warn!(
                        name = raw,
                        count = resolution.candidates.len(),
                        "several objects share this name, using the shallowest"
                    );
                    resolution.path = Some(resolution.candidates[0].path.clone());
                }
                TieBreak::Reject => {
                    warn!(
                        name = raw,
                        count = resolution.candidates.len(),
                        "several objects share this name, refusing to pick"
                    );
                }
            }
        } else {
            resolution.path = Some(resolution.candidates[0].path.clone());
        }

        Ok(resolution)
    }

    /// Every regular file named `leaf` under `scope_dir`, ranked.
    fn search(&self, scope_dir: &Path, leaf: &str) -> Result<Vec<Candidate>, ResolveError> {
        let root = self.paths.absolute(scope_dir);
        let skip_files_dir = matches!(self.scope, Scope::Pages);
        let files_dir_name = self.paths.files_dir_name();

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                if name.starts_with('.') {
                    return false;
                }
                !(skip_files_dir && e.depth() == 1 && e.file_type().is_dir() && name == files_dir_name)
            });

        let mut candidates = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    let source = io::Error::from(err);
                    if source.kind() == io::ErrorKind::NotFound {
                        return Ok(Vec::new());
                    }
                    return Err(ResolveError::Unreadable { path: root, source });
                }
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() || entry.file_name().to_string_lossy() != leaf {
                continue;
            }

            if let Some(relative) = self.paths.relative(entry.path()) {
                candidates.push(Candidate {
                    path: relative,
                    depth: entry.depth().saturating_sub(1),
                });
            }
        }

        candidates.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.path.cmp(&b.path)));
        Ok(candidates)
    }
}
