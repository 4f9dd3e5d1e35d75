//! Configuration loading for `dockmon`
//!
//! Settings are read once at startup from a TOML file, by default
//! `~/.config/dockmon/config.toml`. The remote credential is held as a
//! [`SecretString`] so it is never Debug-printed or logged.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::session::Endpoint;

/// Default SSH port when the config omits one
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default poll interval in seconds when unset or zero
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Errors raised while locating, reading, or validating the config file.
///
/// All of these are fatal at startup; none occur after load.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying TOML failure
        #[source]
        source: toml::de::Error,
    },
    /// A required field is empty or absent
    #[error("missing required config field '{0}'")]
    MissingField(&'static str),
    /// No config path was given and no user config directory exists
    #[error("no config file path given and no user config directory found")]
    NoConfigDir,
}

/// Remote endpoint settings (`[server]` section)
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// Remote hostname or IP address
    #[serde(default)]
    pub address: String,
    /// SSH port (default: 22)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username for password authentication
    #[serde(default)]
    pub user: String,
    /// Password for the remote user
    pub password: Option<SecretString>,
}

/// Poll cadence settings (`[poll]` section)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PollSettings {
    /// Seconds between poll cycles (0 means use the default)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl PollSettings {
    /// Returns the interval with zero treated as unset
    #[must_use]
    pub const fn effective_interval_secs(&self) -> u64 {
        if self.interval_secs == 0 {
            DEFAULT_POLL_INTERVAL_SECS
        } else {
            self.interval_secs
        }
    }
}

/// Trust store settings (`[trust]` section)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrustSettings {
    /// Path to the persisted host-key record file (tilde-expanded)
    #[serde(default)]
    pub store_path: Option<String>,
}

/// Top-level configuration for one monitored endpoint
#[derive(Debug, Deserialize)]
pub struct MonitorConfig {
    /// Remote endpoint settings
    pub server: ServerSettings,
    /// Poll cadence settings
    #[serde(default)]
    pub poll: PollSettings,
    /// Trust store settings
    #[serde(default)]
    pub trust: TrustSettings,
}

const fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

const fn default_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl MonitorConfig {
    /// Loads and validates the configuration.
    ///
    /// With `path` unset, falls back to `<config-dir>/dockmon/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or
    /// if a required field (`server.address`, `server.user`,
    /// `server.password`) is empty or absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self =
            toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from an in-memory TOML string.
    ///
    /// # Errors
    ///
    /// Same validation rules as [`MonitorConfig::load`].
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.address.is_empty() {
            return Err(ConfigError::MissingField("server.address"));
        }
        if self.server.user.is_empty() {
            return Err(ConfigError::MissingField("server.user"));
        }
        if self.server.password.is_none() {
            return Err(ConfigError::MissingField("server.password"));
        }
        Ok(())
    }

    /// Builds the immutable [`Endpoint`] this config describes.
    ///
    /// [`MonitorConfig::load`] and [`MonitorConfig::from_toml`] reject
    /// a missing password, so the fallback here is unreachable on a
    /// validated config.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            address: self.server.address.clone(),
            port: self.server.port,
            user: self.server.user.clone(),
            password: self
                .server
                .password
                .clone()
                .unwrap_or_else(|| SecretString::from(String::new())),
        }
    }

    /// Resolves the trust store path, tilde-expanding a configured
    /// override and falling back to `<config-dir>/dockmon/known_hosts`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when no override is set and
    /// the platform has no user config directory.
    pub fn trust_store_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.trust.store_path {
            Some(raw) => Ok(PathBuf::from(shellexpand::tilde(raw).into_owned())),
            None => dirs::config_dir()
                .map(|dir| dir.join("dockmon").join("known_hosts"))
                .ok_or(ConfigError::NoConfigDir),
        }
    }
}

fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("dockmon").join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    const FULL: &str = r#"
[server]
address = "host.example.com"
port = 2222
user = "monitor"
password = "hunter2"

[poll]
interval_secs = 10

[trust]
store_path = "/tmp/dockmon-hosts"
"#;

    #[test]
    fn test_full_config() {
        let config = MonitorConfig::from_toml(FULL).unwrap();
        assert_eq!(config.server.address, "host.example.com");
        assert_eq!(config.server.port, 2222);
        assert_eq!(config.server.user, "monitor");
        assert_eq!(config.poll.interval_secs, 10);
        assert_eq!(
            config.trust_store_path().unwrap(),
            PathBuf::from("/tmp/dockmon-hosts")
        );

        let endpoint = config.endpoint();
        assert_eq!(endpoint.address, "host.example.com");
        assert_eq!(endpoint.port, 2222);
        assert_eq!(endpoint.password.expose_secret(), "hunter2");
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::from_toml(
            r#"
[server]
address = "a"
user = "u"
password = "p"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, DEFAULT_SSH_PORT);
        assert_eq!(
            config.poll.effective_interval_secs(),
            DEFAULT_POLL_INTERVAL_SECS
        );
    }

    #[test]
    fn test_zero_interval_falls_back_to_default() {
        let settings = PollSettings { interval_secs: 0 };
        assert_eq!(
            settings.effective_interval_secs(),
            DEFAULT_POLL_INTERVAL_SECS
        );

        let settings = PollSettings { interval_secs: 5 };
        assert_eq!(settings.effective_interval_secs(), 5);
    }

    #[test]
    fn test_missing_required_fields() {
        let err = MonitorConfig::from_toml("[server]\nuser = \"u\"\npassword = \"p\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("server.address")));

        let err = MonitorConfig::from_toml("[server]\naddress = \"a\"\npassword = \"p\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("server.user")));

        let err =
            MonitorConfig::from_toml("[server]\naddress = \"a\"\nuser = \"u\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("server.password")));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let config = MonitorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.address, "host.example.com");
    }

    #[test]
    fn test_load_missing_file() {
        let err = MonitorConfig::load(Some(Path::new("/nonexistent/dockmon.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let err = MonitorConfig::from_toml("not toml at all [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_password_not_debug_printed() {
        let config = MonitorConfig::from_toml(FULL).unwrap();
        let debug = format!("{:?}", config.server);
        assert!(!debug.contains("hunter2"));
    }
}
