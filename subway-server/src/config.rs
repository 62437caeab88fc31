//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheConfig;

/// Listen address environment variable.
pub const ADDR_VAR: &str = "SUBWAY_ADDR";
/// Data directory for the file store. Unset means in-memory storage.
pub const DATA_DIR_VAR: &str = "SUBWAY_DATA_DIR";
/// Snapshot cache TTL in seconds.
pub const CACHE_TTL_VAR: &str = "SUBWAY_CACHE_TTL_SECS";
/// Snapshot cache capacity.
pub const CACHE_CAPACITY_VAR: &str = "SUBWAY_CACHE_CAPACITY";

/// Error from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    var: &'static str,
    value: String,
    reason: String,
}

/// Configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub addr: SocketAddr,

    /// Where line files are kept; `None` keeps lines in memory.
    pub data_dir: Option<PathBuf>,

    /// Snapshot cache settings.
    pub cache: CacheConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: None,
            cache: CacheConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from defaults overridden by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ADDR_VAR) {
            config.addr = parse(ADDR_VAR, value)?;
        }
        if let Some(value) = lookup(DATA_DIR_VAR).filter(|v| !v.is_empty()) {
            config.data_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(CACHE_TTL_VAR) {
            config.cache.ttl = Duration::from_secs(parse(CACHE_TTL_VAR, value)?);
        }
        if let Some(value) = lookup(CACHE_CAPACITY_VAR) {
            config.cache.max_capacity = parse(CACHE_CAPACITY_VAR, value)?;
        }

        Ok(config)
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError {
        var,
        reason: e.to_string(),
        value,
    })
}
