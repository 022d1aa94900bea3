//! Wikistore - a git-backed versioned document store for wikis
//!
//! Pages are Markdown files in a git work tree; attachments live under a
//! dedicated directory in the same tree. Wikistore resolves human-typed names
//! to files, reads content and history at any revision through the git
//! command line, and turns unified diffs into numbered rows for display.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to store)
//! - [`store`] - Documents, name resolution, revisions, diffs, URLs
//! - [`core`] - Domain types, naming rules, storage paths, configuration
//! - [`git`] - Backend trait, git CLI client, repository discovery
//! - [`ui`] - Output formatting
//!
//! # Invariants
//!
//! 1. Every resolved path stays inside the storage root
//! 2. Every git invocation is bounded by a timeout
//! 3. A document reports at most two recent versions, newest first
//! 4. Diff line counters never move backwards within a hunk

pub mod cli;
pub mod core;
pub mod git;
pub mod store;
pub mod ui;
