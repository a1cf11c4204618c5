//! CLI argument definitions using clap
//!
//! Commands:
//! - rsqlc compile --entity <name> [--filter <rsql>] [--sort-by <col>] [--sort-dir <dir>]
//! - rsqlc batch
//! - rsqlc schemas
//!
//! Every command takes an optional `--config <path>`; without it the
//! built-in schemas and default settings are used.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rsqlc - compile RSQL filters to parameterized SQL
#[derive(Parser, Debug)]
#[command(name = "rsqlc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile one filter and sort request
    Compile {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Entity whose schema the filter is checked against
        #[arg(long)]
        entity: String,

        /// RSQL filter text
        #[arg(long)]
        filter: Option<String>,

        /// Requested sort column
        #[arg(long)]
        sort_by: Option<String>,

        /// Requested sort direction (asc or desc)
        #[arg(long)]
        sort_dir: Option<String>,
    },

    /// Compile JSON request lines from stdin
    Batch {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List loaded entities and their fields
    Schemas {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
