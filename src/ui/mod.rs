//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Everything the binary prints goes through this module so quiet and JSON
//! modes behave the same for every command. Library diagnostics go through
//! `tracing` instead.

pub mod output;
