//! core
//!
//! Domain types, naming rules, storage layout, and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: VersionId, Revision, RevisionRange
//! - [`naming`] - Title/file-name conversion and name normalization
//! - [`paths`] - Storage layout under the repository root
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Nothing here touches git; the [`crate::git`] layer does that

pub mod config;
pub mod naming;
pub mod paths;
pub mod types;
