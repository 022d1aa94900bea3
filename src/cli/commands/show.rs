//! show command - Print a page, or describe an attachment

use crate::cli::commands::lookup;
use crate::cli::Context;
use crate::core::types::{Revision, VersionId};
use crate::store::{Document, DocumentKind};
use crate::ui::output;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Everything `--json` reports about a shown document.
#[derive(Debug, Serialize)]
struct ShowView {
    kind: DocumentKind,
    name: String,
    title: String,
    url: String,
    path: Option<PathBuf>,
    revision: Revision,
    hashes: Vec<VersionId>,
    latest: bool,
    /// Newest version at `HEAD`
    latest_version: Option<VersionId>,
    size: Option<usize>,
    /// Page text; attachments are described, not printed
    content: Option<String>,
}

impl ShowView {
    fn new(document: &Document) -> Self {
        let content = match document.kind() {
            DocumentKind::Page => document
                .content()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
            DocumentKind::File => None,
        };
        Self {
            kind: document.kind(),
            name: document.url_name(),
            title: document.title(),
            url: document.url_for_show(),
            path: document.canonical_path().map(PathBuf::from),
            revision: document.revision().clone(),
            hashes: document.hashes().to_vec(),
            latest: document.is_latest_revision(),
            latest_version: document.latest_version().cloned(),
            size: document.size(),
            content,
        }
    }
}

/// Show `name` at `revision`.
pub fn show(ctx: &Context, name: &str, revision: Revision) -> Result<()> {
    let wiki = ctx.open_wiki()?;
    let rt = tokio::runtime::Runtime::new()?;
    let document = rt.block_on(lookup(&wiki, name, revision))?;
    let view = ShowView::new(&document);

    if ctx.json {
        return output::json(&view);
    }

    if !view.latest {
        let newest = view
            .latest_version
            .as_ref()
            .map(|id| format!(" ({})", id.short(7)))
            .unwrap_or_default();
        output::warn(
            format!(
                "showing {} at {}, which is not its latest version{}",
                view.title, view.revision, newest
            ),
            ctx.verbosity,
        );
    }

    match view.content {
        Some(text) => print!("{}", text),
        None => {
            let path = view
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            output::print(format!("File: {}", path), ctx.verbosity);
            output::print(format!("Size: {} bytes", view.size.unwrap_or(0)), ctx.verbosity);
            output::print(format!("URL: {}", view.url), ctx.verbosity);
            if !view.hashes.is_empty() {
                output::print("Versions:", ctx.verbosity);
                output::print(output::format_list(&view.hashes, "  "), ctx.verbosity);
            }
        }
    }
    Ok(())
}
