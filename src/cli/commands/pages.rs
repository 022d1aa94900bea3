//! pages command - List all pages, most recently modified first

use crate::cli::Context;
use crate::ui::output;
use anyhow::Result;

/// Print one listing page. A `per_page` of zero uses the configured size.
pub fn pages(ctx: &Context, page: usize, per_page: usize) -> Result<()> {
    let wiki = ctx.open_wiki()?;
    let rt = tokio::runtime::Runtime::new()?;
    let listing = rt.block_on(wiki.catalog().list(page, per_page))?;

    if ctx.json {
        return output::json(&listing);
    }
    output::print(output::format_catalog(&listing), ctx.verbosity);
    Ok(())
}
