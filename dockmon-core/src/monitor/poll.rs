//! Single poll cycle: connect, inspect, parse, format
//!
//! One cycle runs sequentially on one session and closes it on every
//! exit path. No retries and no timeouts live here; the driver decides
//! the cadence and renders per-cycle failures as warning lines.

use thiserror::Error;

use super::parser::{self, CONTAINER_STATES_COMMAND, RESOURCE_USAGE_COMMAND};
use super::status;
use crate::session::{ConnectError, Connector, Endpoint, RemoteSession, RunError};

/// Per-cycle failure, recovered by the driver
#[derive(Debug, Error)]
pub enum PollError {
    /// The session could not be established
    #[error(transparent)]
    Connect(#[from] ConnectError),
    /// An inspection command failed
    #[error(transparent)]
    Command(#[from] RunError),
}

impl PollError {
    /// Whether this cycle failed on a host-key mismatch.
    ///
    /// Drivers must render this distinctly from ordinary failures.
    #[must_use]
    pub fn is_trust_violation(&self) -> bool {
        matches!(self, Self::Connect(err) if err.is_trust_violation())
    }
}

/// Runs one poll cycle against `endpoint` and returns the status line.
///
/// # Errors
///
/// Returns [`PollError`] when the connection or either inspection
/// command fails; the session is closed regardless.
pub async fn poll_once(
    connector: &dyn Connector,
    endpoint: &Endpoint,
) -> Result<String, PollError> {
    let mut session = connector.connect(endpoint).await?;

    let inspected = inspect(session.as_mut()).await;
    session.close().await;
    let (states_output, usage_output) = inspected?;

    let states = parser::parse_container_states(&states_output);
    let usage = parser::parse_resource_usage(&usage_output);
    Ok(status::format_status(&states, &usage))
}

async fn inspect(session: &mut dyn RemoteSession) -> Result<(String, String), RunError> {
    let states = session.run(CONTAINER_STATES_COMMAND).await?;
    let usage = session.run(RESOURCE_USAGE_COMMAND).await?;
    Ok((states, usage))
}
