//! `dockmon` Core Library
//!
//! This crate provides the core functionality for the `dockmon` remote
//! container monitor: connecting to a single remote host over SSH,
//! running two fixed Docker inspection commands, parsing their text
//! output, and rendering a one-line health summary.
//!
//! # Crate Structure
//!
//! - [`config`] - Endpoint and poll settings loaded from a TOML file
//! - [`trust`] - Persisted host-key trust store (trust-on-first-use)
//! - [`session`] - SSH transport: connect, exec, close
//! - [`monitor`] - Docker output parsing, status formatting, poll cycle
//!
//! The crate is terminal-free: all user-facing rendering beyond the
//! status line itself lives in `dockmon-cli`.

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod config;
pub mod monitor;
pub mod session;
pub mod trust;

pub use config::{ConfigError, MonitorConfig, PollSettings};
pub use monitor::{
    CONTAINER_STATES_COMMAND, ContainerResourceSample, ContainerStateCounts, PollError,
    RESOURCE_USAGE_COMMAND, format_status, parse_container_states, parse_resource_usage, poll_once,
};
pub use session::{
    ConnectError, Connector, Endpoint, RemoteSession, RunError, Session, SshConnector,
};
pub use trust::{TrustDecision, TrustStore, TrustStoreError};
