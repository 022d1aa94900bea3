//! resolve command - Show which file a name resolves to
//!
//! Resolution is filesystem-only; no backend calls are made.

use crate::cli::Context;
use crate::core::types::Revision;
use crate::ui::output;
use anyhow::{bail, Result};

/// Resolve `name` as a page, or as an attachment when `file` is set.
pub fn resolve(ctx: &Context, name: &str, file: bool, dir: Option<&str>) -> Result<()> {
    let wiki = ctx.open_wiki()?;
    let document = match (file, dir) {
        (true, Some(dir)) => wiki.file_in(name, dir)?,
        (true, None) => wiki.file(name)?,
        (false, _) => wiki.page(name, Revision::Current)?,
    };
    let resolution = document.resolution();

    if ctx.json {
        output::json(resolution)?;
    } else {
        output::print(output::format_resolution(resolution), ctx.verbosity);
    }

    if !resolution.exists() {
        bail!("'{}' does not resolve to a stored object", name);
    }
    Ok(())
}
