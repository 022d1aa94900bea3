//! cli
//!
//! Command-line interface for Wikistore.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Load configuration and delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, opens the
//! [`crate::store::Wiki`] and dispatches to a handler. Handlers only read;
//! nothing here writes to the repository.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::config::Config;
use crate::store::Wiki;
use crate::ui::output::{self, Verbosity};
use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

/// Settings every handler sees.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub verbosity: Verbosity,
    pub json: bool,
}

impl Context {
    /// Open the wiki described by the loaded configuration.
    pub fn open_wiki(&self) -> Result<Wiki> {
        let root = self.config.repository_path();
        Wiki::open(&self.config)
            .with_context(|| format!("cannot open wiki at {}", root.display()))
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    init_tracing(verbosity);

    // Completions need neither configuration nor a repository.
    if let args::Command::Completion { shell } = cli.command {
        return commands::completion(shell);
    }

    let loaded = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }

    let ctx = Context {
        config: loaded.config.with_root(cli.root),
        verbosity,
        json: cli.json,
    };

    commands::dispatch(cli.command, &ctx)
}

/// `RUST_LOG` wins when set; otherwise `--debug` selects `debug` and
/// `--quiet` silences everything below `error`.
fn init_tracing(verbosity: Verbosity) {
    let default_level = match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Debug => "wikistore=debug",
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
