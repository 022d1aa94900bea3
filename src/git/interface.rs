//! git::interface
//!
//! Repository discovery and validation using git2.
//!
//! The storage root must sit inside a non-bare git work tree. This module
//! checks that once at startup and answers the few repository-wide
//! questions the front end asks (where is the work tree, what is HEAD).
//! Per-document reads go through [`super::backend`] instead.
//!
//! # Error Handling
//!
//! Discovery failures map onto these variants:
//! - [`GitError::NotARepo`]: The storage root is not inside a repository
//! - [`GitError::BareRepo`]: The repository has no work tree
//! - [`GitError::OutsideWorkTree`]: The storage root escapes the work tree
//!
//! # Example
//!
//! ```ignore
//! use wikistore::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("/srv/wiki"))?;
//! if let Some(head) = git.head_version()? {
//!     println!("wiki is at {}", head.short(7));
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::core::types::{TypeError, VersionId};

/// Errors from repository-level git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// No repository above the storage root.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// Where discovery started
        path: PathBuf,
    },

    /// The repository has no work tree to read pages from.
    #[error("bare repository not supported")]
    BareRepo,

    /// The storage root is not below the repository work tree.
    #[error("{path} is outside the work tree {work_dir}")]
    OutsideWorkTree {
        /// The storage root
        path: PathBuf,
        /// The discovered work tree
        work_dir: PathBuf,
    },

    /// The requested commit is not in the object database.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The id that was not found
        oid: String,
    },

    /// Not a usable commit id.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid id string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Classify a git2 failure, naming what was being looked up.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::InvalidOid {
            oid: err.to_string(),
        }
    }
}

/// Information about the repository holding the storage root.
#[derive(Debug, Clone, Serialize)]
pub struct RepoInfo {
    /// The `.git` directory
    pub git_dir: PathBuf,
    /// Top of the work tree
    pub work_dir: PathBuf,
    /// Storage root relative to `work_dir` (empty when they coincide)
    pub prefix: PathBuf,
}

/// Summary of one wiki commit, as shown by `info`.
#[derive(Debug, Clone, Serialize)]
pub struct CommitInfo {
    /// The commit id
    pub id: VersionId,
    /// First line of the commit message
    pub summary: String,
    /// Author name
    pub author_name: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
}

/// Handle on the repository behind the storage root.
pub struct Git {
    /// Discovered repository
    repo: git2::Repository,
    /// The storage root this handle was opened for
    root: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .field("root", &self.root)
            .finish()
    }
}

impl Git {
    /// Open the repository containing `root`.
    ///
    /// Uses `git2::Repository::discover`, so `root` can be any directory
    /// within the work tree.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] when nothing above `root` is a repository
    /// - [`GitError::BareRepo`] when the repository is bare
    pub fn open(root: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(root).map_err(|_| GitError::NotARepo {
            path: root.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self {
            repo,
            root: root.to_path_buf(),
        })
    }

    /// Get repository information, including where the storage root sits
    /// inside the work tree.
    pub fn info(&self) -> Result<RepoInfo, GitError> {
        let git_dir = self.repo.path().to_path_buf();
        let work_dir = self.repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        let canonical_root = self.root.canonicalize().map_err(|e| GitError::Internal {
            message: format!("{}: {}", self.root.display(), e),
        })?;
        let canonical_work = work_dir.canonicalize().map_err(|e| GitError::Internal {
            message: format!("{}: {}", work_dir.display(), e),
        })?;

        let prefix = canonical_root
            .strip_prefix(&canonical_work)
            .map(Path::to_path_buf)
            .map_err(|_| GitError::OutsideWorkTree {
                path: self.root.clone(),
                work_dir: work_dir.clone(),
            })?;

        Ok(RepoInfo {
            git_dir,
            work_dir,
            prefix,
        })
    }

    /// Get the HEAD commit id.
    ///
    /// Returns `None` for a freshly initialized repository with no commits.
    pub fn head_version(&self) -> Result<Option<VersionId>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                return Ok(None)
            }
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        let oid = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .id();

        Ok(Some(VersionId::new(oid.to_string())?))
    }

    /// Look up one commit by id.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] for an id the repository does not have
    pub fn commit_info(&self, id: &VersionId) -> Result<CommitInfo, GitError> {
        let object = self
            .repo
            .revparse_single(id.as_str())
            .map_err(|e| GitError::from_git2(e, id.as_str()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, id.as_str()))?;

        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH)
            .with_timezone(&chrono::Utc);

        Ok(CommitInfo {
            id: VersionId::new(commit.id().to_string())?,
            summary: commit.summary().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_time,
        })
    }
}
