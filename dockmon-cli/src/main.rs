//! `dockmon` CLI - monitor Docker containers on a remote server
//!
//! Connects over SSH (password authentication, trust-on-first-use host
//! keys), runs two fixed inspection commands, and prints a one-line
//! health summary suitable for a tmux status bar. `status` runs one
//! cycle; `watch` repeats on an interval.

mod cli;
mod commands;
mod error;
mod render;

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = commands::dispatch(&cli).await;

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

/// Installs a stderr subscriber whose level follows the -v count.
///
/// `RUST_LOG` still wins when set, matching the usual env-filter rules.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
