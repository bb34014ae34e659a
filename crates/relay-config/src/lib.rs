//! Runtime configuration read once from the environment at startup.
//!
//! The resulting [`RelayConfig`] is immutable and handed by reference to the
//! components that need it.

use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

/// Model the relay forwards every prompt to.
pub const TARGET_MODEL: &str = "llama3";

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_READY_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration loading errors.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Immutable process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Base URL of the Ollama server, without a trailing slash.
    pub ollama_host: String,
    pub model: String,
    pub bind_addr: String,
    /// Block startup until the model is listed as loaded.
    pub wait_on_startup: bool,
    pub ready_timeout: Duration,
    pub ready_interval: Duration,
    /// HTTP timeout for a single `/api/tags` probe.
    pub probe_timeout: Duration,
    /// HTTP timeout for a whole generate call; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            model: TARGET_MODEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            wait_on_startup: false,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            ready_interval: DEFAULT_READY_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            request_timeout: None,
        }
    }
}

impl RelayConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ollama_host = match lookup("OLLAMA_HOST") {
            Some(host) => normalize_host(&host)?,
            None => defaults.ollama_host,
        };

        let bind_addr = match lookup("BIND_ADDR") {
            Some(addr) if addr.trim().is_empty() => return Err(ConfigError::Empty("BIND_ADDR")),
            Some(addr) => addr.trim().to_string(),
            None => defaults.bind_addr,
        };

        let config = Self {
            ollama_host,
            model: defaults.model,
            bind_addr,
            wait_on_startup: parse_bool(&lookup, "OLLAMA_WAIT_ON_STARTUP")?
                .unwrap_or(defaults.wait_on_startup),
            ready_timeout: parse_secs(&lookup, "OLLAMA_READY_TIMEOUT_SECS")?
                .unwrap_or(defaults.ready_timeout),
            ready_interval: parse_nonzero_secs(&lookup, "OLLAMA_READY_INTERVAL_SECS")?
                .unwrap_or(defaults.ready_interval),
            probe_timeout: parse_nonzero_secs(&lookup, "OLLAMA_PROBE_TIMEOUT_SECS")?
                .unwrap_or(defaults.probe_timeout),
            request_timeout: parse_nonzero_secs(&lookup, "OLLAMA_REQUEST_TIMEOUT_SECS")?,
        };

        debug!(?config, "Loaded configuration");
        Ok(config)
    }
}

fn normalize_host(raw: &str) -> Result<String, ConfigError> {
    let host = raw.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(ConfigError::Empty("OLLAMA_HOST"));
    }
    Ok(host.to_string())
}

fn parse_secs<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            u64::from_str(raw.trim())
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue { key, value: raw })
        })
        .transpose()
}

/// Like [`parse_secs`], but a zero duration is rejected.
fn parse_nonzero_secs<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_secs(lookup, key)? {
        Some(d) if d.is_zero() => Err(ConfigError::InvalidValue {
            key,
            value: lookup(key).unwrap_or_default(),
        }),
        other => Ok(other),
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value: raw }),
        })
        .transpose()
}
