//! history command - List every version of a page or attachment

use crate::cli::commands::lookup;
use crate::cli::Context;
use crate::core::types::Revision;
use crate::ui::output;
use anyhow::Result;

/// Print the history of `name`, newest first.
pub fn history(ctx: &Context, name: &str) -> Result<()> {
    let wiki = ctx.open_wiki()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let document = lookup(&wiki, name, Revision::Current).await?;
        let entries = document.fetch_history().await?;

        if ctx.json {
            return output::json(&entries);
        }

        if entries.is_empty() {
            output::print(format!("{} has no history", document.title()), ctx.verbosity);
        }
        for entry in &entries {
            println!("{}", output::format_history_entry(entry));
        }
        Ok(())
    })
}
