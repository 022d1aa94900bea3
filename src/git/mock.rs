//! git::mock
//!
//! Mock backend for deterministic testing.
//!
//! # Design
//!
//! The mock keeps a per-path commit list in memory and answers `hashes`,
//! `show`, `log` and `diff` the way git would, including git's error
//! messages for missing paths and unknown revisions, so the store's error
//! classification can be exercised without a repository. Failures can be
//! forced per operation and every call is recorded.
//!
//! # Example
//!
//! ```
//! use wikistore::git::mock::MockBackend;
//! use wikistore::git::Backend;
//! use wikistore::core::types::Revision;
//! use std::path::Path;
//!
//! # tokio_test::block_on(async {
//! let backend = MockBackend::new()
//!     .commit("Home.md", "aaaa1111", "# Home\n", "Create Home")
//!     .commit("Home.md", "bbbb2222", "# Home v2\n", "Update Home");
//!
//! let hashes = backend.hashes(Path::new("Home.md"), &Revision::Current, 2).await.unwrap();
//! assert_eq!(hashes[0].as_str(), "bbbb2222");
//!
//! let content = backend.show(Path::new("Home.md"), &Revision::Current).await.unwrap();
//! assert_eq!(content, b"# Home v2\n");
//! # });
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::DateTime;

use super::backend::{Backend, BackendError, HistoryEntry};
use crate::core::paths::StoragePaths;
use crate::core::types::{Revision, RevisionRange, VersionId};

/// Mock backend for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockBackend {
    inner: Arc<Mutex<MockBackendInner>>,
}

#[derive(Debug)]
struct MockBackendInner {
    /// Commits per path, oldest first.
    commits: HashMap<String, Vec<MockCommit>>,
    /// Paths that exist on disk but not in any revision.
    shadowed: HashSet<String>,
    /// Canned diffs by (path, range).
    diffs: HashMap<(String, String), String>,
    /// Seconds added to the next commit's timestamp.
    clock: i64,
    fail_on: Option<FailOn>,
    calls: Vec<MockCall>,
}

#[derive(Debug, Clone)]
struct MockCommit {
    version: VersionId,
    content: Vec<u8>,
    entry: HistoryEntry,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Hashes(BackendError),
    Show(BackendError),
    Log(BackendError),
    Diff(BackendError),
}

/// Recorded call for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Hashes {
        path: String,
        revision: Revision,
        limit: usize,
    },
    Show {
        path: String,
        revision: Revision,
    },
    Log {
        path: String,
    },
    Diff {
        path: String,
        range: RevisionRange,
    },
}

impl MockBackend {
    /// Timestamp of the first mock commit.
    pub const EPOCH: i64 = 1_700_000_000;

    /// Create an empty mock backend.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockBackendInner {
                commits: HashMap::new(),
                shadowed: HashSet::new(),
                diffs: HashMap::new(),
                clock: 0,
                fail_on: None,
                calls: Vec::new(),
            })),
        }
    }

    /// Record a commit of `content` at `path`.
    ///
    /// Commits are ordered by insertion; each gets a timestamp one minute
    /// after the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `version` is not a valid version id.
    pub fn commit(
        self,
        path: impl AsRef<Path>,
        version: &str,
        content: impl Into<Vec<u8>>,
        subject: &str,
    ) -> Self {
        let version = VersionId::new(version).expect("mock version must be a hex id");
        {
            let mut inner = self.inner.lock().unwrap();
            let timestamp = DateTime::from_timestamp(Self::EPOCH + inner.clock, 0)
                .expect("mock timestamp in range");
            inner.clock += 60;

            let entry = HistoryEntry {
                version: version.clone(),
                author_name: "Wiki Author".to_string(),
                author_email: "author@example.com".to_string(),
                timestamp,
                subject: subject.to_string(),
            };
            inner
                .commits
                .entry(key(path.as_ref()))
                .or_default()
                .push(MockCommit {
                    version,
                    content: content.into(),
                    entry,
                });
        }
        self
    }

    /// Mark `path` as present on disk but absent from every revision, the
    /// way a case-mismatched name looks on a case-insensitive filesystem.
    pub fn shadow(self, path: impl AsRef<Path>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.shadowed.insert(key(path.as_ref()));
        }
        self
    }

    /// Serve `raw` as the diff of `path` over `range`.
    pub fn with_diff(self, path: impl AsRef<Path>, range: &str, raw: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner
                .diffs
                .insert((key(path.as_ref()), range.to_string()), raw.to_string());
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// ```
    /// use wikistore::git::mock::{MockBackend, FailOn};
    /// use wikistore::git::BackendError;
    /// use std::time::Duration;
    ///
    /// let backend = MockBackend::new().fail_on(FailOn::Show(BackendError::Timeout {
    ///     command: "git show".to_string(),
    ///     timeout: Duration::from_secs(30),
    /// }));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    /// Clear recorded calls.
    pub fn clear_calls(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.clear();
    }

    fn record(&self, call: MockCall) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
    }

    fn check_fail(&self, expected: &str) -> Option<BackendError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::Hashes(e)) if expected == "hashes" => Some(e.clone()),
            Some(FailOn::Show(e)) if expected == "show" => Some(e.clone()),
            Some(FailOn::Log(e)) if expected == "log" => Some(e.clone()),
            Some(FailOn::Diff(e)) if expected == "diff" => Some(e.clone()),
            _ => None,
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn key(path: &Path) -> String {
    StoragePaths::git_path(path)
}

fn fatal(command: &str, message: String) -> BackendError {
    BackendError::CommandFailed {
        command: command.to_string(),
        code: Some(128),
        stderr: format!("fatal: {}\n", message),
    }
}

impl MockBackendInner {
    fn knows(&self, id: &VersionId) -> bool {
        self.commits
            .values()
            .flatten()
            .any(|c| c.version.matches(id))
    }

    /// Commits of `path` visible from `revision`, newest first.
    fn visible(&self, path: &str, revision: &Revision) -> Option<Vec<&MockCommit>> {
        let commits = self.commits.get(path).map(Vec::as_slice).unwrap_or(&[]);
        let mut visible: Vec<&MockCommit> = commits.iter().rev().collect();

        if let Revision::Version(id) = revision {
            if !self.knows(id) {
                return None;
            }
            // Commits are globally ordered by timestamp; anything after the
            // requested commit is not reachable from it.
            let cutoff = self
                .commits
                .values()
                .flatten()
                .find(|c| c.version.matches(id))
                .map(|c| c.entry.timestamp)?;
            visible.retain(|c| c.entry.timestamp <= cutoff);
        }

        Some(visible)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn hashes(
        &self,
        path: &Path,
        revision: &Revision,
        limit: usize,
    ) -> Result<Vec<VersionId>, BackendError> {
        self.record(MockCall::Hashes {
            path: key(path),
            revision: revision.clone(),
            limit,
        });

        if let Some(e) = self.check_fail("hashes") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        let visible = inner.visible(&key(path), revision).ok_or_else(|| {
            fatal(
                "git log",
                format!("bad revision '{}'", revision.as_git_arg()),
            )
        })?;

        Ok(visible
            .into_iter()
            .take(limit)
            .map(|c| c.version.clone())
            .collect())
    }

    async fn show(&self, path: &Path, revision: &Revision) -> Result<Vec<u8>, BackendError> {
        let path = key(path);
        self.record(MockCall::Show {
            path: path.clone(),
            revision: revision.clone(),
        });

        if let Some(e) = self.check_fail("show") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        let rev = revision.as_git_arg();

        let visible = inner.visible(&path, revision).ok_or_else(|| {
            fatal("git show", format!("invalid object name '{}'.", rev))
        })?;

        if let Some(commit) = visible.first() {
            return Ok(commit.content.clone());
        }

        if inner.shadowed.contains(&path) {
            return Err(fatal(
                "git show",
                format!("path '{}' exists on disk, but not in '{}'", path, rev),
            ));
        }

        Err(fatal(
            "git show",
            format!("path '{}' does not exist in '{}'", path, rev),
        ))
    }

    async fn log(&self, path: &Path) -> Result<Vec<HistoryEntry>, BackendError> {
        let path = key(path);
        self.record(MockCall::Log { path: path.clone() });

        if let Some(e) = self.check_fail("log") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .commits
            .get(&path)
            .map(|commits| commits.iter().rev().map(|c| c.entry.clone()).collect())
            .unwrap_or_default())
    }

    async fn diff(&self, path: &Path, range: &RevisionRange) -> Result<String, BackendError> {
        let path = key(path);
        self.record(MockCall::Diff {
            path: path.clone(),
            range: range.clone(),
        });

        if let Some(e) = self.check_fail("diff") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        for side in range.sides() {
            if !inner.knows(side) {
                return Err(fatal(
                    "git diff",
                    format!(
                        "ambiguous argument '{}': unknown revision or path not in the working tree.",
                        range
                    ),
                ));
            }
        }

        Ok(inner
            .diffs
            .get(&(path, range.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
