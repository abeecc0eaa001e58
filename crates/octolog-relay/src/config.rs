//! Application configuration loaded from environment variables.

use std::path::PathBuf;

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Shared secret expected in the `octolog-token` request header.
    pub auth_token: String,

    /// Slack incoming-webhook URI the relay posts to.
    pub slack_uri: String,

    /// Directory for the RocksDB document store.
    pub store_path: PathBuf,

    /// Port for the Prometheus `/metrics` server (0 disables it).
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `OCTOLOG_AUTH_TOKEN`: Webhook authorization secret
    /// - `OCTOLOG_SLACK_URI`: Slack incoming-webhook URI
    ///
    /// Optional environment variables:
    /// - `OCTOLOG_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `OCTOLOG_STORE_PATH`: Store directory (default: "./data/store")
    /// - `OCTOLOG_METRICS_PORT`: Metrics port (default: 9090, 0 disables)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("OCTOLOG_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let auth_token = std::env::var("OCTOLOG_AUTH_TOKEN")
            .map_err(|_| anyhow::anyhow!("OCTOLOG_AUTH_TOKEN environment variable is required"))?;
        if auth_token.trim().is_empty() {
            anyhow::bail!("OCTOLOG_AUTH_TOKEN must not be empty");
        }

        let slack_uri = std::env::var("OCTOLOG_SLACK_URI")
            .map_err(|_| anyhow::anyhow!("OCTOLOG_SLACK_URI environment variable is required"))?;

        let store_path = std::env::var("OCTOLOG_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/store"));

        let metrics_port = match std::env::var("OCTOLOG_METRICS_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("OCTOLOG_METRICS_PORT must be a port number"))?,
            Err(_) => 9090,
        };

        // The token and webhook URI are secrets; log everything else.
        tracing::info!(
            bind_addr = %bind_addr,
            store_path = %store_path.display(),
            metrics_port,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            auth_token,
            slack_uri,
            store_path,
            metrics_port,
        })
    }
}
