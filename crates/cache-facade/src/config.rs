//! # Cache Configuration
//!
//! Environment-based configuration for the cache facade.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, CacheResult};
use crate::health::{DEFAULT_SERVICE_NAME, DEFAULT_TIMEOUT};
use crate::service::GatePolicy;

/// Settings forwarded to the client's connection info
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Logical database, overrides the one in the URL
    pub database: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Health-check adapter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthConfig {
    pub service: String,
    /// Zero disables the timeout race
    pub timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Top-level cache configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub url: String,
    pub options: ClientOptions,
    pub health: HealthConfig,
    pub gate: GatePolicy,
    /// Probe interval while the connection is down; zero disables probing
    pub reconnect_interval: Duration,
    pub log_level: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            options: ClientOptions::default(),
            health: HealthConfig::default(),
            gate: GatePolicy::default(),
            reconnect_interval: Duration::from_secs(1),
            log_level: "info".to_string(),
        }
    }
}

impl CacheConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Config` when a variable is set but malformed.
    pub fn from_env() -> CacheResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Config` when a value is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CacheResult<Self> {
        let defaults = Self::default();

        Ok(Self {
            url: lookup("REDIS_URL").unwrap_or(defaults.url),

            options: ClientOptions {
                database: parse_opt(&lookup, "REDIS_DB")?,
                username: lookup("REDIS_USERNAME"),
                password: lookup("REDIS_PASSWORD"),
            },

            health: HealthConfig {
                service: lookup("CACHE_HEALTH_SERVICE").unwrap_or(defaults.health.service),
                timeout: parse_opt::<u64>(&lookup, "CACHE_HEALTH_TIMEOUT_MS")?
                    .map_or(defaults.health.timeout, Duration::from_millis),
            },

            gate: parse_opt(&lookup, "CACHE_GATE_POLICY")?.unwrap_or(defaults.gate),

            reconnect_interval: parse_opt::<u64>(&lookup, "CACHE_RECONNECT_PROBE_MS")?
                .map_or(defaults.reconnect_interval, Duration::from_millis),

            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }
}

fn parse_opt<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> CacheResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| CacheError::Config(format!("{key}={raw}: {e}")))
        })
        .transpose()
}
