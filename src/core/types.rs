//! core::types
//!
//! Strong types for revision addressing.
//!
//! # Types
//!
//! - [`VersionId`] - Git object identifier naming a historical state
//! - [`Revision`] - Either the current state or an explicit version
//! - [`RevisionRange`] - An `old..new` comparison between two versions
//!
//! # Validation
//!
//! These types enforce validity at construction time. A revision string
//! that reaches the git backend has already been checked, so user input can
//! never smuggle options or arbitrary revspecs onto a git command line.
//!
//! # Examples
//!
//! ```
//! use wikistore::core::types::{Revision, RevisionRange, VersionId};
//!
//! let id = VersionId::new("ABC1234").unwrap();
//! assert_eq!(id.as_str(), "abc1234");
//!
//! let rev: Revision = "HEAD".parse().unwrap();
//! assert!(rev.is_current());
//!
//! let range: RevisionRange = "abc1234..def5678".parse().unwrap();
//! assert_eq!(range.baseline().as_str(), "abc1234");
//! assert_eq!(range.target().as_str(), "def5678");
//!
//! assert!(VersionId::new("--output=x").is_err());
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid version id: {0}")]
    InvalidVersionId(String),

    #[error("invalid revision range: {0}")]
    InvalidRevisionRange(String),
}

/// A git object identifier (full or abbreviated).
///
/// Ids are normalized to lowercase. Abbreviated ids are accepted because
/// they travel in URLs; git resolves them when the backend is invoked.
///
/// # Example
///
/// ```
/// use wikistore::core::types::VersionId;
///
/// let id = VersionId::new("abc123def4567890abc123def4567890abc12345").unwrap();
/// assert_eq!(id.short(7), "abc123d");
///
/// assert!(VersionId::new("abc").is_err());
/// assert!(VersionId::new("xyz1234").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId(String);

impl VersionId {
    /// Shortest abbreviation git accepts.
    pub const MIN_LEN: usize = 4;

    /// SHA-256 ids are 64 hex characters.
    pub const MAX_LEN: usize = 64;

    /// Create a new validated version id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidVersionId` if the string is not 4-64 hex
    /// characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().trim().to_ascii_lowercase();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        if id.len() < Self::MIN_LEN || id.len() > Self::MAX_LEN {
            return Err(TypeError::InvalidVersionId(format!(
                "expected {} to {} hex characters, got {}",
                Self::MIN_LEN,
                Self::MAX_LEN,
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidVersionId(format!(
                "'{}' is not hexadecimal",
                id
            )));
        }
        Ok(())
    }

    /// Get an abbreviated form of the id.
    ///
    /// Returns the first `len` characters, or the whole id if it is shorter.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Check whether `other` names the same object, allowing either side
    /// to be abbreviated.
    ///
    /// ```
    /// use wikistore::core::types::VersionId;
    ///
    /// let full = VersionId::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// let short = VersionId::new("abc123d").unwrap();
    /// assert!(full.matches(&short));
    /// assert!(short.matches(&full));
    /// ```
    pub fn matches(&self, other: &VersionId) -> bool {
        self.0.starts_with(&other.0) || other.0.starts_with(&self.0)
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VersionId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<VersionId> for String {
    fn from(id: VersionId) -> Self {
        id.0
    }
}

impl FromStr for VersionId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for VersionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The revision a document is read at.
///
/// `Current` renders as `HEAD`, which is also what git is asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum Revision {
    /// The latest committed state.
    #[default]
    Current,
    /// An explicit historical version.
    Version(VersionId),
}

impl Revision {
    /// The symbolic name git uses for the current revision.
    pub const HEAD: &'static str = "HEAD";

    /// Check if this is the current revision marker.
    pub fn is_current(&self) -> bool {
        matches!(self, Revision::Current)
    }

    /// The explicit version, if any.
    pub fn version(&self) -> Option<&VersionId> {
        match self {
            Revision::Current => None,
            Revision::Version(id) => Some(id),
        }
    }

    /// The revision spec handed to git.
    pub fn as_git_arg(&self) -> &str {
        match self {
            Revision::Current => Self::HEAD,
            Revision::Version(id) => id.as_str(),
        }
    }
}

impl FromStr for Revision {
    type Err = TypeError;

    /// Parse a revision: empty or `HEAD` (any case) is current, anything
    /// else must be a version id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(Self::HEAD) {
            return Ok(Revision::Current);
        }
        VersionId::new(s).map(Revision::Version)
    }
}

impl From<VersionId> for Revision {
    fn from(id: VersionId) -> Self {
        Revision::Version(id)
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_git_arg())
    }
}

/// A directional comparison between two versions.
///
/// The left side is the baseline and the right side is the target.
/// Order matters: `a..b` and `b..a` produce mirrored diffs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionRange {
    baseline: VersionId,
    target: VersionId,
}

impl RevisionRange {
    /// Separator between the two sides.
    pub const SEPARATOR: &'static str = "..";

    /// Create a range from baseline to target.
    pub fn new(baseline: VersionId, target: VersionId) -> Self {
        Self { baseline, target }
    }

    /// The baseline version (left side).
    pub fn baseline(&self) -> &VersionId {
        &self.baseline
    }

    /// The target version (right side).
    pub fn target(&self) -> &VersionId {
        &self.target
    }

    /// Both sides in display order.
    pub fn sides(&self) -> [&VersionId; 2] {
        [&self.baseline, &self.target]
    }
}

impl FromStr for RevisionRange {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (baseline, target) = s.trim().split_once(Self::SEPARATOR).ok_or_else(|| {
            TypeError::InvalidRevisionRange(format!("'{}' has no '..' separator", s))
        })?;

        // "a...b" means something else to git; refuse it rather than guess.
        if target.starts_with('.') {
            return Err(TypeError::InvalidRevisionRange(format!(
                "'{}' must use exactly two dots",
                s
            )));
        }

        let baseline = VersionId::new(baseline)
            .map_err(|e| TypeError::InvalidRevisionRange(format!("left side: {}", e)))?;
        let target = VersionId::new(target)
            .map_err(|e| TypeError::InvalidRevisionRange(format!("right side: {}", e)))?;

        Ok(Self { baseline, target })
    }
}

impl std::fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.baseline, Self::SEPARATOR, self.target)
    }
}
