//! store
//!
//! The versioned document store.
//!
//! # Modules
//!
//! - [`wiki`] - Shared handle: paths, backend, settings; creates documents
//! - [`document`] - Pages and attachments: resolve, fetch, history, compare
//! - [`resolver`] - Human-typed names to files under the storage root
//! - [`revision`] - Backend access for one path, with error classification
//! - [`diff`] - Unified diff text to numbered display rows
//! - [`locator`] - Canonical URLs per action
//! - [`catalog`] - Paginated page listing
//!
//! # Flow
//!
//! ```text
//! name ──► NameResolver ──► Resolution ──► RevisionStore ──► Backend (git)
//!                                             │
//!                         DocumentState ◄─────┘
//! ```
//!
//! A document never talks to git directly; the [`Wiki`] injects the backend,
//! so tests swap in [`crate::git::mock::MockBackend`].

pub mod catalog;
pub mod diff;
pub mod document;
pub mod locator;
pub mod resolver;
pub mod revision;
pub mod wiki;

pub use catalog::{Catalog, CatalogEntry, CatalogPage};
pub use diff::{DiffLine, LineKind, LineNumber};
pub use document::{
    Ambiguity, Comparison, Document, DocumentError, DocumentKind, DocumentState,
};
pub use locator::{Action, Locator};
pub use resolver::{Candidate, NameResolver, Resolution, ResolveError, Scope, Strategy};
pub use revision::{RevisionStore, Snapshot, StoreError, HASH_LIMIT};
pub use wiki::{Wiki, WikiSettings};
