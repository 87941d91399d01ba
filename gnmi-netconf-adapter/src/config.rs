//! Adapter configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration for the adapter, loaded from a JSON5 file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// gNMI server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// The NETCONF device behind the adapter.
    pub device: DeviceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Optional path to a JSON schema tree, replacing the built-in model.
    #[serde(default)]
    pub schema_file: Option<String>,
}

/// gNMI server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:11161").
    #[serde(default = "default_listen_address")]
    pub address: String,

    /// TLS configuration.
    #[serde(default)]
    pub tls: TlsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
            tls: TlsConfig::default(),
        }
    }
}

/// Server-side TLS configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Enable TLS.
    #[serde(default)]
    pub enabled: bool,

    /// Path to the server certificate file.
    #[serde(default)]
    pub certificate: Option<String>,

    /// Path to the server private key file.
    #[serde(default)]
    pub key: Option<String>,

    /// Path to the CA certificate used to verify clients.
    #[serde(default)]
    pub ca_certificate: Option<String>,
}

/// The NETCONF device behind the adapter; one device per adapter instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device address, `host` or `host:port` (defaults to port 830).
    pub address: String,

    /// NETCONF username.
    pub username: String,

    /// NETCONF password.
    pub password: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,

    /// Structured JSON format for log aggregation systems.
    Json,
}

fn default_listen_address() -> String {
    "0.0.0.0:11161".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AdapterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&content)?;
        Ok(config)
    }
}

/// Initialize tracing with the given configuration.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
        }
    }

    Ok(())
}
