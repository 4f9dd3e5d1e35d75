//! SSH session management: connect, exec, close
//!
//! One authenticated session per poll cycle, one command per exec
//! channel. Host identity is validated through the [`TrustStore`]
//! exactly once per connection attempt; a reject aborts the handshake
//! and surfaces as a distinguishable trust violation. Authentication is
//! password-only.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::keys::{HashAlg, PublicKey};
use russh::{ChannelMsg, Disconnect};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::trust::{TrustDecision, TrustStore, TrustStoreError};

/// Timeout for the TCP dial and SSH handshake (seconds).
///
/// Commands deliberately have no timeout of their own: a hung remote
/// command delays the next poll cycle rather than being cancelled.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// One remote target, immutable after config load
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Remote hostname or IP address
    pub address: String,
    /// SSH port
    pub port: u16,
    /// Username for password authentication
    pub user: String,
    /// Password for the remote user
    pub password: SecretString,
}

/// Failures while establishing an authenticated session.
///
/// Everything here is a single per-cycle "unable to connect" condition
/// for the caller; [`ConnectError::TrustViolation`] additionally signals
/// a possible adversary and must never be auto-resolved.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Transport-level failure: dial, handshake, or protocol error
    #[error("unable to connect to {host}:{port}: {source}")]
    Transport {
        /// Remote hostname
        host: String,
        /// Remote port
        port: u16,
        /// Underlying SSH failure
        #[source]
        source: russh::Error,
    },
    /// The dial or handshake did not complete in time
    #[error("unable to connect to {host}:{port}: connection timed out")]
    Timeout {
        /// Remote hostname
        host: String,
        /// Remote port
        port: u16,
    },
    /// The server rejected the password
    #[error("authentication rejected for user '{user}' on {host}")]
    AuthRejected {
        /// Username that was presented
        user: String,
        /// Remote hostname
        host: String,
    },
    /// The server presented a key that differs from the recorded one
    #[error("host key mismatch for '{host}': recorded {recorded}, presented {presented}")]
    TrustViolation {
        /// Remote hostname
        host: String,
        /// Fingerprint on record
        recorded: String,
        /// Fingerprint the server presented
        presented: String,
    },
    /// The trust store could not persist a learned key
    #[error(transparent)]
    Trust(#[from] TrustStoreError),
}

impl ConnectError {
    /// Whether this failure indicates a possible man-in-the-middle
    #[must_use]
    pub const fn is_trust_violation(&self) -> bool {
        matches!(self, Self::TrustViolation { .. })
    }
}

/// Failures while running a command on an established session.
///
/// A non-zero remote exit status is a command failure, not a transport
/// failure; the partial captured output is kept for diagnostics.
#[derive(Debug, Error)]
pub enum RunError {
    /// The remote command exited non-zero
    #[error("command failed with exit status {status}")]
    ExitStatus {
        /// Remote exit status
        status: u32,
        /// Combined output captured before exit
        output: String,
    },
    /// The exec channel failed at the transport level
    #[error("command failed: {source}")]
    Transport {
        /// Underlying SSH failure
        #[source]
        source: russh::Error,
    },
    /// The channel closed without reporting an exit status
    #[error("command failed: channel closed before reporting an exit status")]
    NoExitStatus {
        /// Combined output captured before the close
        output: String,
    },
}

impl RunError {
    /// Partial output captured before the failure, if any was produced
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::ExitStatus { output, .. } | Self::NoExitStatus { output } => Some(output),
            Self::Transport { .. } => None,
        }
    }
}

/// russh handler that routes host-key checks through the trust store.
///
/// A reject (or a failed learn-persist) is recorded in `failure` and the
/// handshake is aborted by returning `false`; `Session::connect` then
/// reports the recorded cause instead of the generic transport error.
struct TrustHandler {
    host: String,
    trust: Arc<Mutex<TrustStore>>,
    failure: Arc<Mutex<Option<ConnectError>>>,
}

impl client::Handler for TrustHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint(HashAlg::Sha256).to_string();

        let decision = self
            .trust
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .verify(&self.host, &fingerprint);

        match decision {
            TrustDecision::Accept => Ok(true),
            TrustDecision::Learn => {
                // The record must be durable before the handshake is
                // allowed to complete.
                let learned = self
                    .trust
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .learn(&self.host, &fingerprint);
                match learned {
                    Ok(()) => Ok(true),
                    Err(err) => {
                        self.record_failure(ConnectError::Trust(err));
                        Ok(false)
                    }
                }
            }
            TrustDecision::Reject {
                recorded,
                presented,
            } => {
                tracing::warn!(
                    host = %self.host,
                    recorded,
                    presented,
                    "host key mismatch, aborting handshake"
                );
                self.record_failure(ConnectError::TrustViolation {
                    host: self.host.clone(),
                    recorded,
                    presented,
                });
                Ok(false)
            }
        }
    }
}

impl TrustHandler {
    fn record_failure(&self, err: ConnectError) {
        *self
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(err);
    }
}

/// An authenticated SSH session to one endpoint
pub struct Session {
    handle: Handle<TrustHandler>,
    closed: bool,
}

impl Session {
    /// Opens an authenticated session to `endpoint`.
    ///
    /// The trust store's verify is invoked exactly once per attempt.
    /// No retries happen here; retry policy belongs to the poll driver.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError`] on dial, handshake, trust, or
    /// authentication failure.
    pub async fn connect(
        endpoint: &Endpoint,
        trust: Arc<Mutex<TrustStore>>,
    ) -> Result<Self, ConnectError> {
        let config = Arc::new(client::Config::default());
        let failure = Arc::new(Mutex::new(None));
        let handler = TrustHandler {
            host: endpoint.address.clone(),
            trust,
            failure: Arc::clone(&failure),
        };

        tracing::debug!(host = %endpoint.address, port = endpoint.port, "connecting");

        let connecting = client::connect(
            config,
            (endpoint.address.as_str(), endpoint.port),
            handler,
        );
        let mut handle =
            match tokio::time::timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS), connecting).await
            {
                Ok(Ok(handle)) => handle,
                Ok(Err(source)) => {
                    // A trust failure recorded by the handler takes
                    // precedence over the generic handshake error.
                    let recorded = failure
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .take();
                    return Err(recorded.unwrap_or(ConnectError::Transport {
                        host: endpoint.address.clone(),
                        port: endpoint.port,
                        source,
                    }));
                }
                Err(_) => {
                    return Err(ConnectError::Timeout {
                        host: endpoint.address.clone(),
                        port: endpoint.port,
                    });
                }
            };

        let auth = handle
            .authenticate_password(endpoint.user.as_str(), endpoint.password.expose_secret())
            .await
            .map_err(|source| ConnectError::Transport {
                host: endpoint.address.clone(),
                port: endpoint.port,
                source,
            })?;

        if auth.success() {
            Ok(Self {
                handle,
                closed: false,
            })
        } else {
            Err(ConnectError::AuthRejected {
                user: endpoint.user.clone(),
                host: endpoint.address.clone(),
            })
        }
    }

    /// Runs one command in a fresh exec channel.
    ///
    /// Stdout and stderr are concatenated in the order produced;
    /// exactly one trailing newline is trimmed, nothing else.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::ExitStatus`] (with the partial output) when
    /// the command exits non-zero, [`RunError::Transport`] on channel
    /// failure.
    pub async fn run(&self, command: &str) -> Result<String, RunError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|source| RunError::Transport { source })?;
        channel
            .exec(true, command)
            .await
            .map_err(|source| RunError::Transport { source })?;

        let mut captured: Vec<u8> = Vec::new();
        let mut exit_status: Option<u32> = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => captured.extend_from_slice(data),
                // ext 1 is the stderr stream
                ChannelMsg::ExtendedData { ref data, ext: 1 } => captured.extend_from_slice(data),
                ChannelMsg::ExitStatus {
                    exit_status: status,
                } => exit_status = Some(status),
                _ => {}
            }
        }

        let mut output = String::from_utf8_lossy(&captured).into_owned();
        if output.ends_with('\n') {
            output.pop();
        }

        match exit_status {
            Some(0) => Ok(output),
            Some(status) => Err(RunError::ExitStatus { status, output }),
            None => Err(RunError::NoExitStatus { output }),
        }
    }

    /// Releases the transport. Idempotent; `Drop` also tears down the
    /// connection, so every exit path ends up closed.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
        {
            tracing::debug!(error = %err, "disconnect failed");
        }
    }
}

/// Capability to open sessions, injectable for tests.
///
/// The poll cycle depends on this trait rather than on a concrete
/// transport, so test drivers can substitute a scripted implementation
/// without any global state.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens an authenticated session to `endpoint`
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn RemoteSession>, ConnectError>;
}

/// An open session as seen by the poll cycle
#[async_trait]
pub trait RemoteSession: Send {
    /// Runs one command, returning its combined output
    async fn run(&mut self, command: &str) -> Result<String, RunError>;
    /// Releases the transport; idempotent
    async fn close(&mut self);
}

#[async_trait]
impl RemoteSession for Session {
    async fn run(&mut self, command: &str) -> Result<String, RunError> {
        Self::run(self, command).await
    }

    async fn close(&mut self) {
        Self::close(self).await;
    }
}

/// Production [`Connector`] backed by russh and a shared trust store
pub struct SshConnector {
    trust: Arc<Mutex<TrustStore>>,
}

impl SshConnector {
    /// Wraps a loaded trust store for use across poll cycles
    #[must_use]
    pub fn new(trust: TrustStore) -> Self {
        Self {
            trust: Arc::new(Mutex::new(trust)),
        }
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn RemoteSession>, ConnectError> {
        let session = Session::connect(endpoint, Arc::clone(&self.trust)).await?;
        Ok(Box::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_debug_redacts_password() {
        let endpoint = Endpoint {
            address: "host".to_string(),
            port: 22,
            user: "u".to_string(),
            password: SecretString::from("hunter2".to_string()),
        };
        let debug = format!("{endpoint:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_trust_violation_is_distinguishable() {
        let err = ConnectError::TrustViolation {
            host: "host1".to_string(),
            recorded: "SHA256:abc".to_string(),
            presented: "SHA256:def".to_string(),
        };
        assert!(err.is_trust_violation());
        let text = err.to_string();
        assert!(text.contains("host1"));
        assert!(text.contains("SHA256:abc"));
        assert!(text.contains("SHA256:def"));

        let err = ConnectError::AuthRejected {
            user: "u".to_string(),
            host: "host1".to_string(),
        };
        assert!(!err.is_trust_violation());
    }

    #[test]
    fn test_run_error_keeps_partial_output() {
        let err = RunError::ExitStatus {
            status: 127,
            output: "docker: command not found".to_string(),
        };
        assert_eq!(err.output(), Some("docker: command not found"));
        assert!(err.to_string().contains("127"));
    }
}
