//! Configuration management for the view counter replica
//!
//! Environment-based configuration with defaults, TOML file loading
//! and validation. Replica identity, the peer list, the anti-entropy
//! interval and all per-call timeouts are deployment parameters, not
//! constants in the core.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main replica configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Replica identity and peer set
    pub replica: ReplicaConfig,

    /// Sync behavior: push, pull timeouts, anti-entropy cadence
    pub sync: SyncConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Seed for the video catalog stand-in
    pub catalog: CatalogConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,
}

/// Replica identity and peer set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaConfig {
    /// Stable identity of this replica; generated when unset so two
    /// misconfigured replicas never share a counter row
    pub id: Option<String>,

    /// Every other replica in the deployment
    pub peers: Vec<PeerConfig>,
}

/// One peer entry in the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    /// The peer's replica id
    pub id: String,

    /// Base URL of the peer's HTTP surface
    pub url: String,
}

/// Sync behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Push snapshots to peers after each increment
    pub push_enabled: bool,

    /// Run the periodic anti-entropy loop
    pub periodic_enabled: bool,

    /// Anti-entropy sweep interval
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Wait after startup before the first sweep
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,

    /// Deadline for one push to one peer
    #[serde(with = "humantime_serde")]
    pub push_timeout: Duration,

    /// Deadline for one pull from one peer; bounds read latency
    #[serde(with = "humantime_serde")]
    pub pull_timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,
}

/// Video catalog seed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Video ids the catalog stand-in will report as existing
    pub video_ids: Vec<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            replica: ReplicaConfig::default(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:8080".parse().expect("valid default bind address") }
    }
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self { id: None, peers: Vec::new() }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            push_enabled: true,
            periodic_enabled: true,
            interval: Duration::from_secs(30),
            initial_delay: Duration::from_secs(10),
            push_timeout: Duration::from_secs(5),
            pull_timeout: Duration::from_secs(3),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { video_ids: Vec::new() }
    }
}

impl ReplicaConfig {
    /// Configured replica id, or a freshly generated one
    ///
    /// Call once at startup and keep the result; identity must be
    /// stable for the process lifetime.
    pub fn resolve_id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("replica-{}", uuid::Uuid::new_v4()),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern `VIEWCOUNTER_<SECTION>_<KEY>`,
    /// e.g. `VIEWCOUNTER_SERVER_BIND_ADDRESS=0.0.0.0:8081`. Peers use
    /// `id=url` pairs separated by commas:
    /// `VIEWCOUNTER_REPLICA_PEERS=replica-2=http://backend2:8080`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server config
        if let Ok(addr) = env::var("VIEWCOUNTER_SERVER_BIND_ADDRESS") {
            config.server.bind_address = addr
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid bind address: {}", e)))?;
        }

        // Replica config
        if let Ok(id) = env::var("VIEWCOUNTER_REPLICA_ID") {
            config.replica.id = Some(id);
        }
        if let Ok(peers) = env::var("VIEWCOUNTER_REPLICA_PEERS") {
            config.replica.peers = parse_peer_list(&peers)?;
        }

        // Sync config
        if let Ok(enabled) = env::var("VIEWCOUNTER_SYNC_PUSH_ENABLED") {
            config.sync.push_enabled = enabled
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid push flag: {}", e)))?;
        }
        if let Ok(enabled) = env::var("VIEWCOUNTER_SYNC_PERIODIC_ENABLED") {
            config.sync.periodic_enabled = enabled
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid periodic flag: {}", e)))?;
        }
        if let Ok(secs) = env::var("VIEWCOUNTER_SYNC_INTERVAL_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid sync interval: {}", e)))?;
            config.sync.interval = Duration::from_secs(secs);
        }

        // Logging config
        if let Ok(level) = env::var("VIEWCOUNTER_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = env::var("VIEWCOUNTER_LOG_JSON") {
            config.logging.json_format = json
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid JSON flag: {}", e)))?;
        }

        // Catalog config
        if let Ok(ids) = env::var("VIEWCOUNTER_CATALOG_VIDEO_IDS") {
            config.catalog.video_ids = parse_id_list(&ids)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.interval.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "sync interval must be greater than zero".to_string(),
            ));
        }
        if self.sync.pull_timeout.is_zero() || self.sync.push_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "sync timeouts must be greater than zero".to_string(),
            ));
        }

        for peer in &self.replica.peers {
            if peer.id.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "peer with empty replica id".to_string(),
                ));
            }
            if peer.url.is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "peer {} has an empty url",
                    peer.id
                )));
            }
        }

        if let Some(id) = &self.replica.id {
            if id.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "replica id must not be empty".to_string(),
                ));
            }
            if self.replica.peers.iter().any(|p| &p.id == id) {
                return Err(ConfigError::ValidationFailed(
                    "replica lists itself as a peer".to_string(),
                ));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }
}

fn parse_peer_list(raw: &str) -> Result<Vec<PeerConfig>, ConfigError> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            let (id, url) = entry.trim().split_once('=').ok_or_else(|| {
                ConfigError::InvalidValue(format!("Peer entry '{}' is not id=url", entry))
            })?;
            Ok(PeerConfig { id: id.to_string(), url: url.to_string() })
        })
        .collect()
}

fn parse_id_list(raw: &str) -> Result<Vec<u64>, ConfigError> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            entry.trim().parse().map_err(|e| {
                ConfigError::InvalidValue(format!("Invalid video id '{}': {}", entry, e))
            })
        })
        .collect()
}
