//! CLI error types and exit codes.

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration or trust store problems at startup
    pub const GENERAL_ERROR: i32 = 1;
}

/// CLI error type.
///
/// Only startup failures surface here; per-cycle connection and command
/// failures are rendered as warning lines and never terminate the
/// process.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Trust store error
    #[error("Trust store error: {0}")]
    TrustStore(String),
}

impl From<dockmon_core::config::ConfigError> for CliError {
    fn from(err: dockmon_core::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<dockmon_core::trust::TrustStoreError> for CliError {
    fn from(err: dockmon_core::trust::TrustStoreError) -> Self {
        Self::TrustStore(err.to_string())
    }
}

impl CliError {
    /// Returns the process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::TrustStore(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
