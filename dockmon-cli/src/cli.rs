//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// `dockmon` command-line interface for remote container monitoring
#[derive(Parser)]
#[command(name = "dockmon")]
#[command(author, version, about = "Monitor Docker containers running on a remote server")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, env = "DOCKMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one poll cycle and print the status line
    #[command(about = "Print one container status line and exit")]
    Status,

    /// Poll continuously, one status line per cycle
    #[command(about = "Print a container status line every poll interval")]
    Watch {
        /// Override the poll interval from the config (seconds)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}
