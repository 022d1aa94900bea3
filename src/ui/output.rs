//! ui::output
//!
//! Terminal rendering of documents, diffs, history and listings.
//!
//! # Design
//!
//! Plain output honours `--quiet`; documents themselves are always printed.
//! When `--json` is enabled, output is machine-readable JSON.

use std::fmt::Display;

use serde::Serialize;

use crate::git::HistoryEntry;
use crate::store::{CatalogPage, DiffLine, LineKind, Resolution};

/// Width of each line-number column in comparisons.
const NUMBER_WIDTH: usize = 6;

/// Abbreviated version length in listings.
const SHORT_VERSION: usize = 7;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only errors
    Quiet,
    /// Warnings and status lines
    Normal,
    /// Everything, plus backend tracing
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print `value` as pretty JSON (always shown).
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One comparison row: left number, right number, raw line.
pub fn format_diff_line(line: &DiffLine) -> String {
    let marker = match line.kind {
        LineKind::HunkHeader => "",
        _ => "|",
    };
    format!(
        "{:>width$} {:>width$} {} {}",
        line.left.to_string(),
        line.right.to_string(),
        marker,
        line.text,
        width = NUMBER_WIDTH
    )
    .trim_end()
    .to_string()
}

/// A whole comparison, one row per line.
pub fn format_diff(lines: &[DiffLine]) -> String {
    lines
        .iter()
        .map(format_diff_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// One history row: short version, date, author, subject.
pub fn format_history_entry(entry: &HistoryEntry) -> String {
    format!(
        "{}  {}  {}  {}",
        entry.version.short(SHORT_VERSION),
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.author_name,
        entry.subject
    )
}

/// Resolution summary, followed by every search hit.
pub fn format_resolution(resolution: &Resolution) -> String {
    let mut out = match &resolution.path {
        Some(path) => format!("{} -> {}", resolution.requested, path.display()),
        None => format!("{} -> (unresolved)", resolution.requested),
    };
    out.push_str(&format!("\nStrategy: {}", strategy_name(resolution)));
    if resolution.directory {
        out.push_str("\nDirectory: yes");
    }
    if !resolution.candidates.is_empty() {
        let hits: Vec<String> = resolution
            .candidates
            .iter()
            .map(|c| format!("{} (depth {})", c.path.display(), c.depth))
            .collect();
        out.push_str("\nCandidates:\n");
        out.push_str(&format_list(&hits, "  "));
    }
    out
}

fn strategy_name(resolution: &Resolution) -> String {
    serde_json::to_value(resolution.strategy)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Catalog listing with a page footer.
pub fn format_catalog(listing: &CatalogPage) -> String {
    let mut rows: Vec<String> = listing
        .entries
        .iter()
        .map(|entry| {
            let latest = entry
                .hashes
                .first()
                .map(|h| h.short(SHORT_VERSION).to_string())
                .unwrap_or_default();
            match &entry.range {
                Some(range) => format!("{:<30} {}  compare {}", entry.title, latest, range),
                None => format!("{:<30} {}", entry.title, latest),
            }
        })
        .collect();
    rows.push(format!(
        "Page {} of {} ({} pages)",
        listing.current_page, listing.total_pages, listing.total_items
    ));
    rows.join("\n")
}
