//! One-shot status command.

use std::path::Path;

use dockmon_core::config::MonitorConfig;
use dockmon_core::monitor::poll_once;
use dockmon_core::session::SshConnector;
use dockmon_core::trust::TrustStore;

use crate::error::CliError;
use crate::render;

/// Runs one poll cycle and prints the result.
///
/// A failed cycle prints a warning line and still exits zero; only
/// startup configuration problems are process failures.
pub async fn cmd_status(config_path: Option<&Path>, no_color: bool) -> Result<(), CliError> {
    let config = MonitorConfig::load(config_path)?;
    let trust = TrustStore::load(config.trust_store_path()?)?;
    let connector = SshConnector::new(trust);

    match poll_once(&connector, &config.endpoint()).await {
        Ok(line) => println!("{line}"),
        Err(err) => {
            tracing::warn!(error = %err, "poll cycle failed");
            println!("{}", render::poll_failure_line(&err, !no_color));
        }
    }
    Ok(())
}
