//! core::naming
//!
//! Mapping between human page names and storage names.
//!
//! # Features
//!
//! - Turn a page title into a storage-safe name (`wikify`)
//! - Turn a storage name back into a title (`unwikify`)
//! - Normalize untrusted relative paths
//! - Capitalize the first character for the case-mismatch retry

/// Characters that never make it into a storage name.
const STRIPPED: [char; 9] = ['<', '>', ':', '"', '|', '?', '*', '#', '%'];

/// Naming options taken from the `[pages]` config section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Namer {
    /// Lowercase every storage name.
    pub lowercase: bool,
}

impl Namer {
    /// Create a namer.
    pub fn new(lowercase: bool) -> Self {
        Self { lowercase }
    }

    /// Convert a page title into a storage name.
    ///
    /// Whitespace runs become a single `-`; characters that are unsafe in
    /// file names or URLs are dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use wikistore::core::naming::Namer;
    ///
    /// let namer = Namer::default();
    /// assert_eq!(namer.wikify("  Getting   started "), "Getting-started");
    /// assert_eq!(namer.wikify("What? Why*"), "What-Why");
    ///
    /// let lower = Namer::new(true);
    /// assert_eq!(lower.wikify("Getting Started"), "getting-started");
    /// ```
    pub fn wikify(&self, title: &str) -> String {
        let name = title
            .split_whitespace()
            .map(|word| word.chars().filter(|c| !STRIPPED.contains(c)).collect::<String>())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        if self.lowercase {
            name.to_lowercase()
        } else {
            name
        }
    }

    /// Convert a storage name back into a readable title.
    ///
    /// # Example
    ///
    /// ```
    /// use wikistore::core::naming::Namer;
    ///
    /// assert_eq!(Namer::default().unwikify("Getting-started"), "Getting started");
    /// assert_eq!(Namer::new(true).unwikify("getting-started"), "Getting started");
    /// ```
    pub fn unwikify(&self, name: &str) -> String {
        let title = name.replace('-', " ");
        if self.lowercase {
            capitalize_first(&title)
        } else {
            title
        }
    }
}

/// Uppercase the first character, leaving the rest untouched.
///
/// # Example
///
/// ```
/// use wikistore::core::naming::capitalize_first;
///
/// assert_eq!(capitalize_first("home"), "Home");
/// assert_eq!(capitalize_first("éclair"), "Éclair");
/// assert_eq!(capitalize_first(""), "");
/// ```
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalize an untrusted name into relative path segments.
///
/// Backslashes count as separators; empty and `.` segments are dropped.
/// Returns `None` for names that climb out with `..` or that are empty.
///
/// # Example
///
/// ```
/// use wikistore::core::naming::normalize_segments;
///
/// assert_eq!(
///     normalize_segments("/docs//./guide.pdf"),
///     Some(vec!["docs".to_string(), "guide.pdf".to_string()])
/// );
/// assert_eq!(normalize_segments("a\\b"), Some(vec!["a".to_string(), "b".to_string()]));
/// assert_eq!(normalize_segments("../etc/passwd"), None);
/// assert_eq!(normalize_segments("  "), None);
/// ```
pub fn normalize_segments(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim().replace('\\', "/");
    let mut segments = Vec::new();

    for segment in raw.split('/') {
        match segment.trim() {
            "" | "." => continue,
            ".." => return None,
            s => segments.push(s.to_string()),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}
