//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. Nothing outside it spawns a
//! git process or imports `git2`.
//!
//! - [`interface`] opens and validates the repository with `git2` at startup
//! - [`backend`] reads per-document content, history and diffs by running
//!   the git CLI as a subprocess
//! - [`mock`] is an in-memory [`Backend`] for tests
//!
//! # Invariants
//!
//! - Backend paths are storage-relative with `/` separators
//! - Revisions reaching a git command line are validated [`Revision`] or
//!   [`RevisionRange`] values, never raw user strings
//! - Every subprocess is bounded by a timeout
//!
//! [`Revision`]: crate::core::types::Revision
//! [`RevisionRange`]: crate::core::types::RevisionRange
//!
//! # Example
//!
//! ```ignore
//! use wikistore::git::{Backend, Git, GitCli};
//! use wikistore::core::types::Revision;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("/srv/wiki"))?;
//! let info = git.info()?;
//!
//! let cli = GitCli::new("/srv/wiki");
//! let entries = cli.log(Path::new("Home.md")).await?;
//! ```

pub mod backend;
mod interface;
pub mod mock;

pub use backend::{
    Backend, BackendError, CommandExecutor, CommandResult, GitCli, HistoryEntry, ProcessExecutor,
};
pub use interface::{CommitInfo, Git, GitError, RepoInfo};
