//! info command - Show repository and configuration details
//!
//! Reads the repository through `git2` only; no subprocesses are spawned.

use crate::cli::Context;
use crate::git::{CommitInfo, Git, RepoInfo};
use crate::ui::output;
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct InfoView {
    root: PathBuf,
    repository: RepoInfo,
    head: Option<CommitInfo>,
    files_dir: String,
    index_page: String,
    git_binary: String,
    timeout_secs: u64,
    config: Option<PathBuf>,
}

/// Print where the wiki lives and how it is configured.
pub fn info(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let root = config.repository_path();
    let git = Git::open(&root)
        .with_context(|| format!("cannot open wiki at {}", root.display()))?;
    let repository = git.info()?;
    let head = match git.head_version()? {
        Some(id) => Some(git.commit_info(&id)?),
        None => None,
    };

    let view = InfoView {
        root,
        repository,
        head,
        files_dir: config.files_dir().to_string(),
        index_page: config.index_page().to_string(),
        git_binary: config.git_binary().to_string(),
        timeout_secs: config.timeout().as_secs(),
        config: config.loaded_from().map(PathBuf::from),
    };

    if ctx.json {
        return output::json(&view);
    }

    let v = ctx.verbosity;
    output::print(format!("Root: {}", view.root.display()), v);
    output::print(format!("Git dir: {}", view.repository.git_dir.display()), v);
    output::print(format!("Work tree: {}", view.repository.work_dir.display()), v);
    if !view.repository.prefix.as_os_str().is_empty() {
        output::print(format!("Prefix: {}", view.repository.prefix.display()), v);
    }
    match &view.head {
        Some(head) => output::print(
            format!(
                "Head: {} {} ({}, {})",
                head.id.short(7),
                head.summary,
                head.author_name,
                head.author_time.format("%Y-%m-%d %H:%M")
            ),
            v,
        ),
        None => output::print("Head: (no commits)", v),
    }
    output::print(format!("Files dir: {}", view.files_dir), v);
    output::print(format!("Index page: {}", view.index_page), v);
    output::print(
        format!("Git: {} (timeout {}s)", view.git_binary, view.timeout_secs),
        v,
    );
    match &view.config {
        Some(path) => output::print(format!("Config: {}", path.display()), v),
        None => output::print("Config: (defaults)", v),
    }
    Ok(())
}
