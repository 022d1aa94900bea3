//! store::diff
//!
//! Unified diff parsing into numbered, classified rows.
//!
//! # Grammar
//!
//! - Everything before the first `@@` marker is file header and skipped. A
//!   later `diff --git` line starts a new header.
//! - `@@ -a[,b] +c[,d] @@` resets the left counter to `a` and the right
//!   counter to `c` and is emitted as a hunk header row.
//! - `-` lines are removed, `+` lines added, `\` lines (e.g. "No newline at
//!   end of file") dropped, anything else is context.
//!
//! The output is flat across hunks.
//!
//! # Example
//!
//! ```
//! use wikistore::store::diff::{parse, LineKind, LineNumber};
//!
//! let lines = parse("@@ -1,2 +1,3 @@\n context\n-removed\n+added1\n+added2\n");
//!
//! assert_eq!(lines.len(), 5);
//! assert_eq!(lines[0].kind, LineKind::HunkHeader);
//! assert_eq!(lines[1].left, LineNumber::Number(1));
//! assert_eq!(lines[2].right, LineNumber::Blank);
//! assert_eq!(lines[4].right, LineNumber::Number(3));
//! ```

use serde::{Deserialize, Serialize};

/// Classification of a diff row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineKind {
    HunkHeader,
    Context,
    Added,
    Removed,
}

impl LineKind {
    /// Stable CSS class used by the presentation layer.
    pub fn css_class(&self) -> &'static str {
        match self {
            LineKind::HunkHeader => "gc",
            LineKind::Removed => "gd",
            LineKind::Added => "gi",
            LineKind::Context => "",
        }
    }
}

/// A line number on one side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum LineNumber {
    /// A real line number.
    Number(u32),
    /// Placeholder on hunk header rows.
    HunkMarker,
    /// The line does not exist on this side.
    Blank,
}

impl LineNumber {
    /// The numeric value, if any.
    pub fn value(&self) -> Option<u32> {
        match self {
            LineNumber::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for LineNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineNumber::Number(n) => write!(f, "{}", n),
            LineNumber::HunkMarker => write!(f, "..."),
            LineNumber::Blank => Ok(()),
        }
    }
}

/// One row of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// The raw diff line, including its leading marker
    pub text: String,
    pub left: LineNumber,
    pub right: LineNumber,
    pub kind: LineKind,
}

impl DiffLine {
    /// The line without its leading `+`, `-` or space. Hunk headers are
    /// returned whole.
    pub fn content(&self) -> &str {
        match self.kind {
            LineKind::HunkHeader => &self.text,
            _ => self
                .text
                .char_indices()
                .nth(1)
                .map(|(i, _)| &self.text[i..])
                .unwrap_or(""),
        }
    }
}

const HUNK_MARKER: &str = "@@";
const FILE_HEADER: &str = "diff --git ";

/// Parse raw unified diff text.
///
/// Never fails: lines that fit no rule are context. Parsing the same input
/// twice yields identical output.
pub fn parse(raw: &str) -> Vec<DiffLine> {
    let mut lines = Vec::new();
    let mut in_header = true;
    let mut left: u32 = 0;
    let mut right: u32 = 0;

    for line in raw.lines() {
        if line.starts_with(FILE_HEADER) {
            in_header = true;
            continue;
        }

        if line.starts_with(HUNK_MARKER) {
            in_header = false;
            if let Some((l, r)) = parse_hunk_header(line) {
                left = l;
                right = r;
            }
            lines.push(DiffLine {
                text: line.to_string(),
                left: LineNumber::HunkMarker,
                right: LineNumber::HunkMarker,
                kind: LineKind::HunkHeader,
            });
            continue;
        }

        if in_header || line.starts_with('\\') {
            continue;
        }

        let row = match line.as_bytes().first() {
            Some(b'-') => {
                let row = DiffLine {
                    text: line.to_string(),
                    left: LineNumber::Number(left),
                    right: LineNumber::Blank,
                    kind: LineKind::Removed,
                };
                left = left.saturating_add(1);
                row
            }
            Some(b'+') => {
                let row = DiffLine {
                    text: line.to_string(),
                    left: LineNumber::Blank,
                    right: LineNumber::Number(right),
                    kind: LineKind::Added,
                };
                right = right.saturating_add(1);
                row
            }
            _ => {
                let row = DiffLine {
                    text: line.to_string(),
                    left: LineNumber::Number(left),
                    right: LineNumber::Number(right),
                    kind: LineKind::Context,
                };
                left = left.saturating_add(1);
                right = right.saturating_add(1);
                row
            }
        };
        lines.push(row);
    }

    lines
}

/// Read the starting line numbers from a hunk header.
///
/// ```
/// use wikistore::store::diff::parse_hunk_header;
///
/// assert_eq!(parse_hunk_header("@@ -12,4 +13,6 @@ fn main()"), Some((12, 13)));
/// assert_eq!(parse_hunk_header("@@ -1 +1 @@"), Some((1, 1)));
/// assert_eq!(parse_hunk_header("@@ garbage @@"), None);
/// ```
pub fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let ranges = line.strip_prefix(HUNK_MARKER)?;
    let ranges = match ranges.find(HUNK_MARKER) {
        Some(end) => &ranges[..end],
        None => ranges,
    };

    let mut left = None;
    let mut right = None;
    for token in ranges.split_whitespace() {
        if let Some(rest) = token.strip_prefix('-') {
            left = left.or_else(|| range_start(rest));
        } else if let Some(rest) = token.strip_prefix('+') {
            right = right.or_else(|| range_start(rest));
        }
    }

    Some((left?, right?))
}

fn range_start(range: &str) -> Option<u32> {
    range.split(',').next()?.parse().ok()
}
