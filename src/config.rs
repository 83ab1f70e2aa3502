//! Client configuration.
//!
//! Configuration is plain data: the engine never reads files or the
//! environment on its own. [`ClientConfig::load`] exists for hosts (such as
//! the `cnc-monitor` binary) that want a JSON settings file.
//!
//! ```json
//! {
//!   "endpoint": "tls://192.168.0.220:8000",
//!   "timeouts": { "first_byte_ms": 5000, "inter_byte_ms": 1000 },
//!   "connect_timeout_ms": 5000,
//!   "tls": { "verify_server": false, "ca_file": null },
//!   "refresh_interval_ms": 200
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::transport::TransportSettings;

/// Default deadline for the first bytes of a response.
pub const DEFAULT_FIRST_BYTE_TIMEOUT_MS: u64 = 5_000;

/// Default deadline between chunks of a response already in progress.
pub const DEFAULT_INTER_BYTE_TIMEOUT_MS: u64 = 1_000;

/// Default TCP connect (and TLS handshake) deadline.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Default API server port.
pub const DEFAULT_PORT: u16 = 8000;

/// Read deadlines for a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadTimeouts {
    pub first_byte_ms: u64,
    pub inter_byte_ms: u64,
}

impl ReadTimeouts {
    /// First-byte deadline. Never zero: a zero socket timeout means "block
    /// forever" to the OS.
    pub fn first_byte(&self) -> Duration {
        Duration::from_millis(self.first_byte_ms.max(1))
    }

    pub fn inter_byte(&self) -> Duration {
        Duration::from_millis(self.inter_byte_ms.max(1))
    }
}

impl Default for ReadTimeouts {
    fn default() -> Self {
        Self {
            first_byte_ms: DEFAULT_FIRST_BYTE_TIMEOUT_MS,
            inter_byte_ms: DEFAULT_INTER_BYTE_TIMEOUT_MS,
        }
    }
}

/// Server certificate handling for TLS channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    /// Validate the server certificate chain and host name. Off by default
    /// because API servers ship self-signed certificates.
    pub verify_server: bool,
    /// PEM bundle of trusted roots, required when `verify_server` is set.
    pub ca_file: Option<PathBuf>,
}

/// Where the API server listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16, tls: bool) -> Self {
        Self {
            host: host.into(),
            port,
            tls,
        }
    }
}

/// Endpoint parse failures.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Invalid endpoint URL {0:?}: {1}")]
    Url(String, url::ParseError),

    #[error("Unsupported endpoint scheme {0:?} (expected tcp or tls)")]
    Scheme(String),

    #[error("Endpoint {0:?} has no host")]
    MissingHost(String),
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    /// Parse `tcp://host[:port]` or `tls://host[:port]`. A bare `host:port`
    /// is treated as plain TCP.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let with_scheme = if text.contains("://") {
            text.to_string()
        } else {
            format!("tcp://{}", text)
        };

        let url = Url::parse(&with_scheme).map_err(|e| EndpointError::Url(s.to_string(), e))?;
        let tls = match url.scheme() {
            "tcp" => false,
            "tls" | "ssl" => true,
            other => return Err(EndpointError::Scheme(other.to_string())),
        };
        let host = match url.host() {
            Some(url::Host::Ipv6(addr)) => addr.to_string(),
            Some(host) => host.to_string(),
            None => String::new(),
        };
        if host.is_empty() {
            return Err(EndpointError::MissingHost(s.to_string()));
        }

        Ok(Endpoint {
            host,
            port: url.port().unwrap_or(DEFAULT_PORT),
            tls,
        })
    }
}

impl TryFrom<String> for Endpoint {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_string()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.tls { "tls" } else { "tcp" };
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", scheme, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", scheme, self.host, self.port)
        }
    }
}

/// Full client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server to connect to; hosts may also pass an endpoint explicitly.
    pub endpoint: Option<Endpoint>,
    pub timeouts: ReadTimeouts,
    pub connect_timeout_ms: u64,
    pub tls: TlsSettings,
    /// Polling period for hosts that refresh an info context.
    pub refresh_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeouts: ReadTimeouts::default(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            tls: TlsSettings::default(),
            refresh_interval_ms: 200,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a JSON file.
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load configuration from `path` if it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but cannot be parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write configuration as pretty JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Settings handed to the transport channel.
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            timeouts: self.timeouts,
            connect_timeout: self.connect_timeout(),
            tls: self.tls.clone(),
        }
    }
}

/// Resolve the default configuration file path.
///
/// Resolution order:
/// 1. `<config dir>/cnc-api-client/client.json` (XDG on Linux, Application
///    Support on macOS, AppData on Windows)
/// 2. `./cnc-api-client.json` (fallback)
pub fn default_config_path() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("cnc-api-client").join("client.json"),
        None => PathBuf::from("cnc-api-client.json"),
    }
}
