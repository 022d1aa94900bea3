//! git::backend
//!
//! The version-control seam: `hashes`, `show`, `log` and `diff` over a
//! storage-relative path.
//!
//! # Design
//!
//! The `Backend` trait is async because every operation runs an external
//! process. The production implementation, [`GitCli`], shells out to `git`
//! through `tokio::process` with the storage root as working directory and
//! bounds each invocation with a timeout; a timed-out child is killed when
//! its future is dropped. Tests substitute [`super::mock::MockBackend`] or
//! inject a [`CommandExecutor`].
//!
//! Git is run with `LC_ALL=C` so that its error messages stay stable; the
//! store classifies failures (missing object, path present on disk but not
//! in the revision) by reading them.
//!
//! # Example
//!
//! ```ignore
//! use wikistore::git::{Backend, GitCli};
//! use wikistore::core::types::Revision;
//! use std::path::Path;
//!
//! let git = GitCli::new("/srv/wiki");
//! let hashes = git.hashes(Path::new("Home.md"), &Revision::Current, 2).await?;
//! let content = git.show(Path::new("Home.md"), &Revision::Current).await?;
//! ```

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::paths::StoragePaths;
use crate::core::types::{Revision, RevisionRange, VersionId};

/// Errors from backend invocations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The process could not be started.
    #[error("failed to run `{command}`: {message}")]
    SpawnFailed { command: String, message: String },

    /// The process did not finish in time and was killed.
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// The process exited unsuccessfully.
    #[error("`{command}` failed with code {code:?}: {}", stderr.trim())]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The process succeeded but its output could not be understood.
    #[error("malformed output from `{command}`: {message}")]
    Malformed { command: String, message: String },
}

impl BackendError {
    /// Diagnostic text reported by the failed command, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            BackendError::CommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Git found the path in the work tree but not in the requested
    /// revision. On case-insensitive filesystems this is how a name that
    /// differs from the committed one only by case shows up.
    pub fn is_path_not_in_revision(&self) -> bool {
        self.stderr()
            .map(|s| s.contains("exists on disk, but not in"))
            .unwrap_or(false)
    }

    /// Git reports that the path or revision does not exist.
    pub fn is_missing_object(&self) -> bool {
        const MARKERS: [&str; 7] = [
            "does not exist in",
            "does not have any commits yet",
            "invalid object name",
            "not a valid object name",
            "unknown revision",
            "bad revision",
            "bad default revision",
        ];
        self.stderr()
            .map(|s| MARKERS.iter().any(|m| s.contains(m)))
            .unwrap_or(false)
    }
}

/// One commit touching a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Commit id
    pub version: VersionId,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub timestamp: DateTime<Utc>,
    /// First line of the commit message
    pub subject: String,
}

/// Version-control operations over storage-relative paths.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Up to `limit` most recent version ids touching `path`, newest first,
    /// up to and including `revision`.
    async fn hashes(
        &self,
        path: &Path,
        revision: &Revision,
        limit: usize,
    ) -> Result<Vec<VersionId>, BackendError>;

    /// Content of `path` at `revision`.
    async fn show(&self, path: &Path, revision: &Revision) -> Result<Vec<u8>, BackendError>;

    /// Full history of `path`, newest first. Empty if untracked.
    async fn log(&self, path: &Path) -> Result<Vec<HistoryEntry>, BackendError>;

    /// Raw unified diff of `path` between the two sides of `range`.
    async fn diff(&self, path: &Path, range: &RevisionRange) -> Result<String, BackendError>;
}

/// Raw result of running a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Runs programs on behalf of [`GitCli`].
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error>;
}

/// Executor backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .current_dir(cwd)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandResult {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Pretty format for `git log`: fields separated by US, records by RS.
const LOG_FORMAT: &str = "--pretty=format:%H%x1f%an%x1f%ae%x1f%at%x1f%s%x1e";

const FIELD_SEPARATOR: char = '\u{1f}';
const RECORD_SEPARATOR: char = '\u{1e}';

/// [`Backend`] that shells out to the git CLI.
#[derive(Debug, Clone)]
pub struct GitCli<E = ProcessExecutor> {
    root: PathBuf,
    program: String,
    timeout: Duration,
    executor: E,
}

impl GitCli<ProcessExecutor> {
    /// Create a backend rooted at the storage root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_executor(root, ProcessExecutor)
    }
}

impl<E: CommandExecutor> GitCli<E> {
    /// Default bound on one invocation.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a backend with a custom executor.
    pub fn with_executor(root: impl Into<PathBuf>, executor: E) -> Self {
        Self {
            root: root.into(),
            program: "git".to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            executor,
        }
    }

    /// Use a different git executable.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Bound every invocation by `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The storage root commands run in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn run(&self, args: Vec<String>) -> Result<Vec<u8>, BackendError> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(command = %command, "invoking git");

        let execution = self.executor.execute(&self.program, &args, &self.root);
        let result = match tokio::time::timeout(self.timeout, execution).await {
            Ok(Ok(result)) => result,
            Ok(Err(error)) => {
                return Err(BackendError::SpawnFailed {
                    command,
                    message: error.to_string(),
                })
            }
            Err(_) => {
                return Err(BackendError::Timeout {
                    command,
                    timeout: self.timeout,
                })
            }
        };

        if result.success {
            return Ok(result.stdout);
        }

        let stderr = if result.stderr.trim().is_empty() {
            String::from_utf8_lossy(&result.stdout).into_owned()
        } else {
            result.stderr
        };

        debug!(command = %command, code = ?result.code, "git failed");
        Err(BackendError::CommandFailed {
            command,
            code: result.code,
            stderr,
        })
    }

    fn utf8(command: &str, stdout: Vec<u8>) -> Result<String, BackendError> {
        String::from_utf8(stdout).map_err(|_| BackendError::Malformed {
            command: command.to_string(),
            message: "output is not valid UTF-8".to_string(),
        })
    }
}

#[async_trait]
impl<E: CommandExecutor> Backend for GitCli<E> {
    async fn hashes(
        &self,
        path: &Path,
        revision: &Revision,
        limit: usize,
    ) -> Result<Vec<VersionId>, BackendError> {
        let args = vec![
            "log".to_string(),
            "-n".to_string(),
            limit.to_string(),
            "--no-color".to_string(),
            "--pretty=format:%H".to_string(),
            revision.as_git_arg().to_string(),
            "--".to_string(),
            StoragePaths::git_path(path),
        ];
        let stdout = Self::utf8("git log", self.run(args).await?)?;

        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                VersionId::new(line).map_err(|e| BackendError::Malformed {
                    command: "git log".to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    async fn show(&self, path: &Path, revision: &Revision) -> Result<Vec<u8>, BackendError> {
        let object = format!(
            "{}:./{}",
            revision.as_git_arg(),
            StoragePaths::git_path(path)
        );
        self.run(vec!["show".to_string(), "--no-color".to_string(), object])
            .await
    }

    async fn log(&self, path: &Path) -> Result<Vec<HistoryEntry>, BackendError> {
        let args = vec![
            "log".to_string(),
            "--no-color".to_string(),
            LOG_FORMAT.to_string(),
            "--".to_string(),
            StoragePaths::git_path(path),
        ];
        let stdout = Self::utf8("git log", self.run(args).await?)?;

        parse_log(&stdout).map_err(|message| BackendError::Malformed {
            command: "git log".to_string(),
            message,
        })
    }

    async fn diff(&self, path: &Path, range: &RevisionRange) -> Result<String, BackendError> {
        let args = vec![
            "diff".to_string(),
            "--no-color".to_string(),
            "--no-ext-diff".to_string(),
            range.to_string(),
            "--".to_string(),
            StoragePaths::git_path(path),
        ];
        let stdout = self.run(args).await?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

/// Parse `git log` output produced with [`LOG_FORMAT`].
///
/// # Example
///
/// ```
/// use wikistore::git::backend::parse_log;
///
/// let raw = "abcd1234\u{1f}Ann\u{1f}ann@example.com\u{1f}1700000000\u{1f}Fix typo\u{1e}\n";
/// let entries = parse_log(raw).unwrap();
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].subject, "Fix typo");
/// ```
pub fn parse_log(raw: &str) -> Result<Vec<HistoryEntry>, String> {
    raw.split(RECORD_SEPARATOR)
        .map(|record| record.trim_matches(|c| c == '\n' || c == '\r'))
        .filter(|record| !record.is_empty())
        .map(parse_log_record)
        .collect()
}

fn parse_log_record(record: &str) -> Result<HistoryEntry, String> {
    let fields: Vec<&str> = record.splitn(5, FIELD_SEPARATOR).collect();
    let [version, author_name, author_email, timestamp, subject] = fields[..] else {
        return Err(format!(
            "expected 5 fields, got {} in record '{}'",
            fields.len(),
            record.escape_debug()
        ));
    };

    let version = VersionId::new(version).map_err(|e| e.to_string())?;
    let seconds: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| format!("invalid timestamp '{}'", timestamp))?;
    let timestamp = DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| format!("timestamp out of range: {}", seconds))?;

    Ok(HistoryEntry {
        version,
        author_name: author_name.to_string(),
        author_email: author_email.to_string(),
        timestamp,
        subject: subject.to_string(),
    })
}
