//! compare command - Compare two versions side by side

use crate::cli::commands::lookup;
use crate::cli::Context;
use crate::core::types::{Revision, RevisionRange};
use crate::ui::output;
use anyhow::Result;

/// Print the numbered diff of `name` over `range`.
pub fn compare(ctx: &Context, name: &str, range: &RevisionRange) -> Result<()> {
    let wiki = ctx.open_wiki()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let document = lookup(&wiki, name, Revision::Current).await?;
        let comparison = document.fetch_revisions_diff(range).await?;

        if ctx.json {
            return output::json(&comparison);
        }

        output::print(
            format!("{} {}", document.title(), comparison.range),
            ctx.verbosity,
        );
        if comparison.lines.is_empty() {
            output::print("No differences", ctx.verbosity);
        } else {
            println!("{}", output::format_diff(&comparison.lines));
        }
        Ok(())
    })
}
