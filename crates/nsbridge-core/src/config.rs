//! Configuration management for nsbridge.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Main configuration for the nsbridge server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Metadata service configuration.
    pub metadata: MetadataConfig,
    /// Caller identity configuration.
    pub identity: IdentityConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(crate::Error::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed.
    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Load configuration from `path` when given, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the given file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind: SocketAddr,
    /// Path to TLS certificate file (optional).
    pub tls_cert: Option<PathBuf>,
    /// Path to TLS private key file (optional).
    pub tls_key: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: SocketAddr::from(([127, 0, 0, 1], 50070)), tls_cert: None, tls_key: None }
    }
}

/// Metadata service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Base URL of the metadata service's WebHDFS endpoint.
    pub endpoint: String,
    /// Request timeout for a single summary call, in seconds.
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self { endpoint: "http://127.0.0.1:9870".to_string(), timeout_secs: 60 }
    }
}

/// Caller identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Identity used when a request carries none, as `user,group,...`.
    pub default_ugi: String,
    /// Whether requests without an explicit identity are served.
    pub allow_anonymous: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self { default_ugi: "webuser,webgroup".to_string(), allow_anonymous: true }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// JSON format.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// Log output format.
    pub format: LogFormat,
    /// Include HTTP request/response logging.
    pub log_requests: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty, log_requests: true }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable metrics collection and endpoint.
    pub enabled: bool,
    /// Port for the metrics endpoint (separate from main server).
    pub port: u16,
    /// Bind address for metrics server.
    pub bind: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: false, port: 9464, bind: "0.0.0.0".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind.port(), 50070);
        assert_eq!(config.identity.default_ugi, "webuser,webgroup");
        assert!(config.identity.allow_anonymous);
        assert_eq!(config.metadata.timeout_secs, 60);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
bind = "0.0.0.0:8080"

[metadata]
endpoint = "http://namenode:9870"
timeout_secs = 5

[identity]
default_ugi = "nobody,nogroup"
allow_anonymous = false

[logging]
level = "debug"
format = "json"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.server.bind.port(), 8080);
        assert_eq!(config.metadata.endpoint, "http://namenode:9870");
        assert_eq!(config.metadata.timeout_secs, 5);
        assert_eq!(config.identity.default_ugi, "nobody,nogroup");
        assert!(!config.identity.allow_anonymous);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.log_requests);
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = Config::parse("[server]\nbind = 12").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[metrics]\nenabled = true\nport = 9100").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9100);

        let config = Config::load(None).unwrap();
        assert!(!config.metrics.enabled);
    }
}
