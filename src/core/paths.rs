//! core::paths
//!
//! Centralized path routing for the wiki storage tree.
//!
//! # Storage Layout
//!
//! Everything lives under the storage root (a git work tree or a
//! directory inside one):
//! - `<Name>.md` - wiki pages, at the top level
//! - `files/` - attachments, arbitrarily nested
//!
//! **Hard rule:** paths handed to the git backend are storage-relative and
//! use `/` separators. All conversions go through `StoragePaths`.
//!
//! # Example
//!
//! ```
//! use wikistore::core::paths::StoragePaths;
//! use std::path::{Path, PathBuf};
//!
//! let paths = StoragePaths::new(PathBuf::from("/srv/wiki"), "files");
//!
//! assert_eq!(paths.files_dir(), PathBuf::from("/srv/wiki/files"));
//! assert_eq!(paths.absolute(Path::new("Home.md")), PathBuf::from("/srv/wiki/Home.md"));
//! assert_eq!(StoragePaths::git_path(Path::new("files/a/b.pdf")), "files/a/b.pdf");
//! ```

use std::path::{Component, Path, PathBuf};

/// Extension of page files.
pub const PAGE_EXTENSION: &str = "md";

/// Path routing for the storage tree.
///
/// # Invariants
///
/// - `root` is the directory every storage-relative path is joined to
/// - `files_dir_name` is a single path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    root: PathBuf,
    files_dir_name: String,
}

impl StoragePaths {
    /// Default attachment directory name.
    pub const DEFAULT_FILES_DIR: &'static str = "files";

    /// Create paths for a storage root.
    pub fn new(root: PathBuf, files_dir_name: impl Into<String>) -> Self {
        Self {
            root,
            files_dir_name: files_dir_name.into(),
        }
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the attachment directory (relative to root).
    pub fn files_dir_name(&self) -> &str {
        &self.files_dir_name
    }

    /// Absolute path of the attachment directory.
    pub fn files_dir(&self) -> PathBuf {
        self.root.join(&self.files_dir_name)
    }

    /// File name of the page stored under an already wikified name.
    ///
    /// ```
    /// use wikistore::core::paths::StoragePaths;
    ///
    /// assert_eq!(StoragePaths::page_file("Home"), "Home.md");
    /// ```
    pub fn page_file(wikified: &str) -> String {
        format!("{}.{}", wikified, PAGE_EXTENSION)
    }

    /// Storage-relative path of an attachment.
    pub fn attachment(&self, segments: &[String]) -> PathBuf {
        let mut path = PathBuf::from(&self.files_dir_name);
        path.extend(segments);
        path
    }

    /// Join a storage-relative path onto the root.
    pub fn absolute(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Strip the root from an absolute path.
    ///
    /// Returns `None` if `absolute` lies outside the root.
    pub fn relative(&self, absolute: &Path) -> Option<PathBuf> {
        absolute
            .strip_prefix(&self.root)
            .ok()
            .map(Path::to_path_buf)
    }

    /// Render a storage-relative path the way git expects it.
    pub fn git_path(relative: &Path) -> String {
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> StoragePaths {
        StoragePaths::new(PathBuf::from("/srv/wiki"), "files")
    }

    #[test]
    fn attachment_joins_segments() {
        let p = paths().attachment(&["docs".to_string(), "a.pdf".to_string()]);
        assert_eq!(p, PathBuf::from("files/docs/a.pdf"));
    }

    #[test]
    fn page_file_appends_extension() {
        assert_eq!(StoragePaths::page_file("Getting-Started"), "Getting-Started.md");
        assert_eq!(StoragePaths::page_file("v1.2"), "v1.2.md");
    }

    #[test]
    fn relative_strips_root() {
        let rel = paths().relative(Path::new("/srv/wiki/files/x.png"));
        assert_eq!(rel, Some(PathBuf::from("files/x.png")));
    }

    #[test]
    fn relative_outside_root_is_none() {
        assert_eq!(paths().relative(Path::new("/etc/passwd")), None);
    }

    #[test]
    fn git_path_uses_forward_slashes() {
        let mut rel = PathBuf::from("files");
        rel.push("nested");
        rel.push("file.txt");
        assert_eq!(StoragePaths::git_path(&rel), "files/nested/file.txt");
    }

    #[test]
    fn custom_files_dir() {
        let p = StoragePaths::new(PathBuf::from("/w"), "uploads");
        assert_eq!(p.files_dir(), PathBuf::from("/w/uploads"));
        assert_eq!(p.files_dir_name(), "uploads");
    }
}
