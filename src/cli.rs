//! Command-line interface, argument parsing via clap.

use clap::{Parser, Subcommand};

/// Catalogo - Personal media catalog server
#[derive(Parser)]
#[command(name = "catalogo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server and background scheduler
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// Run a single metadata refresh pass and exit
    #[command(alias = "-c", alias = "--check")]
    Check {
        /// Maximum number of rows to refresh
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Show refresh cadence stats for the catalog
    Stats,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}
