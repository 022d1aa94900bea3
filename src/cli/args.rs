//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--root <path>`: Use this directory as the storage root
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::types::{Revision, RevisionRange};

/// Wikistore - a git-backed versioned document store for wikis
#[derive(Parser, Debug)]
#[command(name = "wikistore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Storage root (overrides repository.path)
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show which file a name resolves to
    #[command(
        name = "resolve",
        long_about = "Show which file a name resolves to.\n\n\
            Page names are wikified (spaces become dashes) and looked up at the \
            storage root. When no file matches exactly, the name's last segment is \
            tried inside the scope directory, then searched for by base name in any \
            subdirectory. Every search hit is listed, nearest first.",
        after_help = "\
EXAMPLES:
    # Resolve a page title
    wikistore resolve \"Getting Started\"

    # Resolve an attachment
    wikistore resolve --file diagrams/overview.png

    # Restrict the attachment search to one directory
    wikistore resolve --file overview.png --dir diagrams"
    )]
    Resolve {
        /// Page title or attachment path
        name: String,

        /// Resolve an attachment instead of a page
        #[arg(long)]
        file: bool,

        /// Only search this directory inside the attachment directory
        #[arg(long, value_name = "DIR", requires = "file")]
        dir: Option<String>,
    },

    /// Print a page, or describe an attachment
    #[command(
        name = "show",
        long_about = "Print a page, or describe an attachment.\n\n\
            The name is tried as a page first; when no page exists it is tried as \
            an attachment. Pages print their content. Attachments print their path, \
            size and latest versions. Showing an older revision prints a warning.",
        after_help = "\
EXAMPLES:
    wikistore show Home
    wikistore show Home --revision 3f2a9c1
    wikistore show docs/guide.pdf"
    )]
    Show {
        /// Page title or attachment path
        name: String,

        /// Version to show (defaults to the current one)
        #[arg(long, short, value_name = "REV", default_value = "HEAD")]
        revision: Revision,
    },

    /// List every version of a page or attachment
    History {
        /// Page title or attachment path
        name: String,
    },

    /// Compare two versions side by side
    #[command(
        name = "compare",
        after_help = "\
EXAMPLES:
    # Old version first
    wikistore compare Home 1a2b3c4..5d6e7f8"
    )]
    Compare {
        /// Page title or attachment path
        name: String,

        /// Versions as OLD..NEW
        #[arg(value_name = "OLD..NEW")]
        range: RevisionRange,
    },

    /// List all pages, most recently modified first
    Pages {
        /// Listing page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Pages per listing page (defaults to pages.items_per_page)
        #[arg(long, value_name = "N")]
        per_page: Option<usize>,
    },

    /// Show repository and configuration details
    Info,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["wikistore", "show", "Home", "--json", "--root", "/srv/wiki"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.root, Some(PathBuf::from("/srv/wiki")));
        match cli.command {
            Command::Show { name, revision } => {
                assert_eq!(name, "Home");
                assert!(revision.is_current());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn compare_parses_range() {
        let cli = Cli::try_parse_from(["wikistore", "compare", "Home", "aaaa1111..bbbb2222"]).unwrap();
        match cli.command {
            Command::Compare { range, .. } => {
                assert_eq!(range.baseline().as_str(), "aaaa1111");
                assert_eq!(range.target().as_str(), "bbbb2222");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn compare_rejects_bad_range() {
        assert!(Cli::try_parse_from(["wikistore", "compare", "Home", "nope"]).is_err());
    }

    #[test]
    fn dir_requires_file() {
        assert!(Cli::try_parse_from(["wikistore", "resolve", "x.png", "--dir", "a"]).is_err());
        assert!(
            Cli::try_parse_from(["wikistore", "resolve", "x.png", "--file", "--dir", "a"]).is_ok()
        );
    }
}
