//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::codec::{Strategy, DEFAULT_COMPRESSION_LEVEL};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// SQLite database file; `None` keeps records in memory
    pub database_path: Option<PathBuf>,
    /// Strategy for blob writes that do not name one
    pub default_encoding: Strategy,
    /// zlib compression level (0-9)
    pub compression_level: u32,
    /// Expiry offset in seconds for records created without one
    pub default_ttl: u64,
    /// Deadline for each store operation, in milliseconds
    pub store_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATABASE_PATH` - SQLite file (default: unset, in-memory store)
    /// - `DEFAULT_ENCODING` - e.g. `json+zlib`, `csv` (default: json+zlib)
    /// - `COMPRESSION_LEVEL` - 0 to 9 (default: 6)
    /// - `DEFAULT_TTL` - Expiry offset in seconds (default: 3600)
    /// - `STORE_TIMEOUT_MS` - Store deadline in milliseconds (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parsed("SERVER_PORT").unwrap_or(defaults.server_port),
            database_path: env::var("DATABASE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            default_encoding: parsed("DEFAULT_ENCODING").unwrap_or(defaults.default_encoding),
            compression_level: parsed::<u32>("COMPRESSION_LEVEL")
                .map(|level| level.min(9))
                .unwrap_or(defaults.compression_level),
            default_ttl: parsed("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            store_timeout_ms: parsed("STORE_TIMEOUT_MS").unwrap_or(defaults.store_timeout_ms),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            database_path: None,
            default_encoding: Strategy::json_zlib(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            default_ttl: 3600,
            store_timeout_ms: 5000,
        }
    }
}

/// Reads and parses `key`, warning when a set value does not parse.
fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}, using default", key, raw);
            None
        }
    }
}
