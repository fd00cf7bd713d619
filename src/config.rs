//! Connection settings for the remote keyword library.
//!
//! A `ClientConfig` is a plain value: build it once and hand it to
//! [`RpcClient::new`](crate::rpc::RpcClient::new). Nothing here is global.

use std::time::Duration;

use thiserror::Error;

/// Default host of the remote library server.
pub const DEFAULT_HOST: &str = "localhost";

/// Default port of the remote library server.
pub const DEFAULT_PORT: u16 = 8270;

/// Default per-operation timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the host.
pub const HOST_ENV: &str = "NETLIB_HOST";
/// Environment variable overriding the port.
pub const PORT_ENV: &str = "NETLIB_PORT";
/// Environment variable overriding the timeout, in whole seconds.
pub const TIMEOUT_ENV: &str = "NETLIB_TIMEOUT_SECS";

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Name of the offending variable
        var: &'static str,
        /// The raw value found
        value: String,
    },

    /// The timeout must be at least one second.
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Target and timeout for every call made by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host name or IP address of the remote library server.
    pub host: String,
    /// TCP port of the remote library server.
    pub port: u16,
    /// Bound applied separately to connect, write and each read.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Target `host:port` with the default timeout.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Replace the per-operation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration from `NETLIB_HOST`, `NETLIB_PORT` and
    /// `NETLIB_TIMEOUT_SECS`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_ENV) {
            let host = host.trim();
            if !host.is_empty() {
                config.host = host.to_string();
            }
        }

        if let Some(port) = lookup(PORT_ENV) {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: PORT_ENV,
                value: port.clone(),
            })?;
        }

        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: TIMEOUT_ENV,
                value: secs.clone(),
            })?;
            if secs == 0 {
                return Err(ConfigError::ZeroTimeout(TIMEOUT_ENV));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// The `host:port` string used for connecting and in error messages.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
