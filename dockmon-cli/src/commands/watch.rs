//! Continuous polling command.

use std::path::Path;
use std::time::Duration;

use dockmon_core::config::MonitorConfig;
use dockmon_core::monitor::poll_once;
use dockmon_core::session::SshConnector;
use dockmon_core::trust::TrustStore;

use crate::error::CliError;
use crate::render;

/// Polls on an interval, printing one line per cycle.
///
/// Cycles never overlap: the sleep starts only after a cycle finishes,
/// so a slow remote command delays the next cycle rather than stacking
/// connections. Per-cycle failures print a warning line and the loop
/// continues.
pub async fn cmd_watch(
    config_path: Option<&Path>,
    interval_override: Option<u64>,
    no_color: bool,
) -> Result<(), CliError> {
    let config = MonitorConfig::load(config_path)?;
    let trust = TrustStore::load(config.trust_store_path()?)?;
    let connector = SshConnector::new(trust);
    let endpoint = config.endpoint();

    let interval_secs = interval_override
        .filter(|&secs| secs != 0)
        .unwrap_or_else(|| config.poll.effective_interval_secs());
    let interval = Duration::from_secs(interval_secs);

    tracing::info!(
        host = %endpoint.address,
        interval_secs,
        "starting watch loop"
    );

    loop {
        match poll_once(&connector, &endpoint).await {
            Ok(line) => println!("{line}"),
            Err(err) => {
                tracing::warn!(error = %err, "poll cycle failed");
                println!("{}", render::poll_failure_line(&err, !no_color));
            }
        }
        tokio::time::sleep(interval).await;
    }
}
