//! Argument types and CLI definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI arguments.
#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Manage template packages", version)]
pub struct Cli {
    /// Installation directory (default: ~/.stencil/packages)
    #[arg(long, global = true)]
    pub install_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Package management subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Install a template package from an archive file or a feed
    Install {
        /// Local archive path or feed package identifier
        identifier: String,

        /// Version to install (default: latest available)
        #[arg(long)]
        version: Option<String>,

        /// Candidate feed URI, in preference order; repeatable
        #[arg(long = "feed")]
        feeds: Vec<String>,
    },

    /// Remove an installed template package
    Remove {
        /// Package identifier
        identifier: String,
    },

    /// Update an installed template package
    Update {
        /// Package identifier
        identifier: String,

        /// Target version (default: latest available)
        #[arg(long)]
        version: Option<String>,
    },

    /// Check installed packages for available updates
    Check,

    /// List installed template packages
    List {
        /// Show detailed information
        #[arg(long, short)]
        verbose: bool,
    },
}
