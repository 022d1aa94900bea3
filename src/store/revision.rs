//! store::revision
//!
//! Version-controlled access to one stored object.
//!
//! A `RevisionStore` pairs a storage-relative path with the shared backend
//! and turns raw backend failures into the store's error taxonomy:
//!
//! - git reports the path exists on disk but not in the revision:
//!   [`StoreError::NotInRevision`] (the case-mismatch signal)
//! - git reports a missing path or revision: [`StoreError::NotFound`]
//! - anything else: [`StoreError::Backend`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wikistore::core::types::Revision;
//! use wikistore::git::mock::MockBackend;
//! use wikistore::store::RevisionStore;
//!
//! # tokio_test::block_on(async {
//! let backend = MockBackend::new().commit("Home.md", "aaaa1111", "# Home", "Create");
//! let store = RevisionStore::new("Home.md", Arc::new(backend));
//!
//! let snapshot = store.fetch_current(&Revision::Current).await.unwrap();
//! assert_eq!(snapshot.content, b"# Home");
//! assert_eq!(snapshot.hashes.len(), 1);
//! # });
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::core::types::{Revision, RevisionRange, VersionId};
use crate::git::{Backend, BackendError, HistoryEntry};

/// Most recent version plus its predecessor.
pub const HASH_LIMIT: usize = 2;

/// Errors from revision store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing at this path in the requested revision.
    #[error("{} not found at {revision}", path.display())]
    NotFound { path: PathBuf, revision: Revision },

    /// The path exists in the work tree but not in the revision under this
    /// exact name.
    #[error("{} exists on disk but not at {revision}", path.display())]
    NotInRevision { path: PathBuf, revision: Revision },

    /// The backend invocation failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Content and recent versions of an object at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub content: Vec<u8>,
    /// Newest first, at most [`HASH_LIMIT`] entries, as of the fetched
    /// revision
    pub hashes: Vec<VersionId>,
    /// Newest version touching the path at `HEAD`, whatever revision was
    /// fetched
    pub latest: Option<VersionId>,
}

/// Backend access for a single storage path.
#[derive(Clone)]
pub struct RevisionStore {
    path: PathBuf,
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for RevisionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RevisionStore {
    /// Create a store for `path`, relative to the storage root.
    pub fn new(path: impl Into<PathBuf>, backend: Arc<dyn Backend>) -> Self {
        Self {
            path: path.into(),
            backend,
        }
    }

    /// The storage-relative path this store reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch content at `revision` together with the (at most two) latest
    /// versions touching the path up to that revision.
    ///
    /// For an explicit revision the newest version at `HEAD` is looked up as
    /// well. All backend calls run concurrently.
    pub async fn fetch_current(&self, revision: &Revision) -> Result<Snapshot, StoreError> {
        debug!(path = %self.path.display(), %revision, "fetching content");

        let (hashes, content, newest) = tokio::join!(
            self.backend.hashes(&self.path, revision, HASH_LIMIT),
            self.backend.show(&self.path, revision),
            self.newest_at_head(revision),
        );

        let content = content.map_err(|e| self.classify(e, revision))?;
        let mut hashes = hashes.map_err(|e| self.classify(e, revision))?;
        hashes.truncate(HASH_LIMIT);

        let latest = match revision {
            Revision::Current => hashes.first().cloned(),
            Revision::Version(_) => newest?,
        };

        Ok(Snapshot {
            content,
            hashes,
            latest,
        })
    }

    /// Newest version of the path at `HEAD`. Skipped for `HEAD` itself,
    /// where the main lookup already answers it.
    async fn newest_at_head(&self, revision: &Revision) -> Result<Option<VersionId>, StoreError> {
        if *revision == Revision::Current {
            return Ok(None);
        }
        let hashes = self
            .backend
            .hashes(&self.path, &Revision::Current, 1)
            .await?;
        Ok(hashes.into_iter().next())
    }

    /// Full history of the path, newest first.
    ///
    /// An untracked path, or a repository without commits, has an empty
    /// history.
    pub async fn fetch_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        debug!(path = %self.path.display(), "fetching history");

        match self.backend.log(&self.path).await {
            Ok(entries) => Ok(entries),
            Err(e) if e.is_missing_object() => Ok(Vec::new()),
            Err(e) => Err(StoreError::Backend(e)),
        }
    }

    /// Raw unified diff of the path over `range`.
    pub async fn fetch_diff(&self, range: &RevisionRange) -> Result<String, StoreError> {
        debug!(path = %self.path.display(), %range, "fetching diff");

        Ok(self.backend.diff(&self.path, range).await?)
    }

    fn classify(&self, err: BackendError, revision: &Revision) -> StoreError {
        if err.is_path_not_in_revision() {
            StoreError::NotInRevision {
                path: self.path.clone(),
                revision: revision.clone(),
            }
        } else if err.is_missing_object() {
            StoreError::NotFound {
                path: self.path.clone(),
                revision: revision.clone(),
            }
        } else {
            StoreError::Backend(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::{FailOn, MockBackend, MockCall};
    use std::time::Duration;

    fn store(backend: MockBackend, path: &str) -> RevisionStore {
        RevisionStore::new(path, Arc::new(backend))
    }

    fn three_versions() -> MockBackend {
        MockBackend::new()
            .commit("Home.md", "aaaa1111", "v1", "One")
            .commit("Home.md", "bbbb2222", "v2", "Two")
            .commit("Home.md", "cccc3333", "v3", "Three")
    }

    mod fetch_current {
        use super::*;

        #[tokio::test]
        async fn at_most_two_hashes() {
            let backend = three_versions();
            let snapshot = store(backend.clone(), "Home.md")
                .fetch_current(&Revision::Current)
                .await
                .unwrap();

            assert_eq!(snapshot.content, b"v3");
            assert_eq!(snapshot.hashes.len(), 2);
            assert_eq!(snapshot.hashes[0].as_str(), "cccc3333");
            assert_eq!(snapshot.hashes[1].as_str(), "bbbb2222");

            assert!(backend.calls().contains(&MockCall::Hashes {
                path: "Home.md".to_string(),
                revision: Revision::Current,
                limit: HASH_LIMIT,
            }));
        }

        #[tokio::test]
        async fn single_version_has_one_hash() {
            let backend = MockBackend::new().commit("New.md", "aaaa1111", "x", "Create");
            let snapshot = store(backend, "New.md")
                .fetch_current(&Revision::Current)
                .await
                .unwrap();
            assert_eq!(snapshot.hashes.len(), 1);
        }

        #[tokio::test]
        async fn explicit_revision() {
            let revision: Revision = "bbbb2222".parse().unwrap();
            let snapshot = store(three_versions(), "Home.md")
                .fetch_current(&revision)
                .await
                .unwrap();

            assert_eq!(snapshot.content, b"v2");
            assert_eq!(snapshot.hashes[0].as_str(), "bbbb2222");
            assert_eq!(snapshot.hashes[1].as_str(), "aaaa1111");
            assert_eq!(snapshot.latest.unwrap().as_str(), "cccc3333");
        }

        #[tokio::test]
        async fn explicit_revision_looks_up_head_once() {
            let backend = three_versions();
            let revision: Revision = "aaaa1111".parse().unwrap();
            store(backend.clone(), "Home.md")
                .fetch_current(&revision)
                .await
                .unwrap();

            let calls = backend.calls();
            assert!(calls.contains(&MockCall::Hashes {
                path: "Home.md".to_string(),
                revision: Revision::Current,
                limit: 1,
            }));
            assert!(calls.contains(&MockCall::Hashes {
                path: "Home.md".to_string(),
                revision: revision.clone(),
                limit: HASH_LIMIT,
            }));
        }

        #[tokio::test]
        async fn current_revision_latest_is_first_hash() {
            let backend = three_versions();
            let snapshot = store(backend.clone(), "Home.md")
                .fetch_current(&Revision::Current)
                .await
                .unwrap();

            assert_eq!(snapshot.latest.as_ref(), snapshot.hashes.first());
            let head_lookups = backend
                .calls()
                .iter()
                .filter(|c| matches!(c, MockCall::Hashes { .. }))
                .count();
            assert_eq!(head_lookups, 1);
        }

        #[tokio::test]
        async fn missing_path_is_not_found() {
            let err = store(three_versions(), "Nope.md")
                .fetch_current(&Revision::Current)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::NotFound { .. }));
        }

        #[tokio::test]
        async fn unknown_revision_is_not_found() {
            let revision: Revision = "ffff9999".parse().unwrap();
            let err = store(three_versions(), "Home.md")
                .fetch_current(&revision)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::NotFound { .. }));
        }

        #[tokio::test]
        async fn case_mismatch_is_not_in_revision() {
            let backend = three_versions().shadow("home.md");
            let err = store(backend, "home.md")
                .fetch_current(&Revision::Current)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::NotInRevision { .. }));
        }

        #[tokio::test]
        async fn timeout_is_backend_failure() {
            let backend = three_versions().fail_on(FailOn::Show(BackendError::Timeout {
                command: "git show".to_string(),
                timeout: Duration::from_secs(30),
            }));
            let err = store(backend, "Home.md")
                .fetch_current(&Revision::Current)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                StoreError::Backend(BackendError::Timeout { .. })
            ));
        }
    }

    mod fetch_history {
        use super::*;

        #[tokio::test]
        async fn newest_first() {
            let entries = store(three_versions(), "Home.md")
                .fetch_history()
                .await
                .unwrap();

            let subjects: Vec<_> = entries.iter().map(|e| e.subject.as_str()).collect();
            assert_eq!(subjects, vec!["Three", "Two", "One"]);
        }

        #[tokio::test]
        async fn untracked_is_empty() {
            let entries = store(three_versions(), "Nope.md")
                .fetch_history()
                .await
                .unwrap();
            assert!(entries.is_empty());
        }

        #[tokio::test]
        async fn repository_without_commits_is_empty() {
            let backend = MockBackend::new().fail_on(FailOn::Log(BackendError::CommandFailed {
                command: "git log".to_string(),
                code: Some(128),
                stderr: "fatal: your current branch 'main' does not have any commits yet"
                    .to_string(),
            }));
            let entries = store(backend, "Home.md").fetch_history().await.unwrap();
            assert!(entries.is_empty());
        }

        #[tokio::test]
        async fn malformed_output_is_error() {
            let backend = three_versions().fail_on(FailOn::Log(BackendError::Malformed {
                command: "git log".to_string(),
                message: "expected 5 fields".to_string(),
            }));
            let err = store(backend, "Home.md").fetch_history().await.unwrap_err();
            assert!(matches!(err, StoreError::Backend(_)));
        }
    }

    mod fetch_diff {
        use super::*;

        #[tokio::test]
        async fn returns_raw_text() {
            let backend =
                three_versions().with_diff("Home.md", "aaaa1111..cccc3333", "@@ -1 +1 @@\n-v1\n+v3\n");
            let range: RevisionRange = "aaaa1111..cccc3333".parse().unwrap();

            let raw = store(backend, "Home.md").fetch_diff(&range).await.unwrap();
            assert_eq!(raw, "@@ -1 +1 @@\n-v1\n+v3\n");
        }

        #[tokio::test]
        async fn unknown_side_is_backend_failure() {
            let range: RevisionRange = "aaaa1111..ffff9999".parse().unwrap();
            let err = store(three_versions(), "Home.md")
                .fetch_diff(&range)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Backend(_)));
        }
    }
}
