//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the wiki from the loaded configuration
//! 2. Resolves and fetches documents through [`crate::store`]
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Backend calls are async subprocesses. Each handler builds a
//! `tokio::runtime::Runtime` and blocks on its async body, so the dispatch
//! function stays synchronous.

mod compare;
mod completion;
mod history;
mod info;
mod pages;
mod resolve;
mod show;

pub use compare::compare;
pub use completion::completion;
pub use history::history;
pub use info::info;
pub use pages::pages;
pub use resolve::resolve;
pub use show::show;

use crate::cli::args::Command;
use crate::cli::Context;
use crate::core::types::Revision;
use crate::store::{Document, DocumentState, Wiki};
use anyhow::Result;
use tracing::debug;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Resolve { name, file, dir } => resolve(ctx, &name, file, dir.as_deref()),
        Command::Show { name, revision } => show(ctx, &name, revision),
        Command::History { name } => history(ctx, &name),
        Command::Compare { name, range } => compare(ctx, &name, &range),
        Command::Pages { page, per_page } => pages(ctx, page, per_page.unwrap_or(0)),
        Command::Info => info(ctx),
        Command::Completion { shell } => completion(shell),
    }
}

/// Fetch `name` as a page, or as an attachment when no page by that name
/// exists.
///
/// Fails with the document's error when neither fetch succeeds.
pub(crate) async fn lookup(wiki: &Wiki, name: &str, revision: Revision) -> Result<Document> {
    let mut page = wiki.page(name, revision.clone())?;
    page.fetch().await?;
    if page.is_ok() {
        return Ok(page);
    }
    if page.exists() {
        return Err(failure(&page));
    }

    debug!(name, "no such page, trying attachments");
    let mut file = wiki.file_at(name, revision)?;
    file.fetch().await?;
    if file.is_ok() {
        return Ok(file);
    }
    if file.exists() || file.resolution().is_ambiguous() || file.resolution().directory {
        return Err(failure(&file));
    }
    Err(failure(&page))
}

fn failure(document: &Document) -> anyhow::Error {
    match document.state() {
        DocumentState::Failed { reason } => anyhow::Error::new(reason.clone()),
        _ => anyhow::anyhow!("'{}' could not be fetched", document.name()),
    }
}
