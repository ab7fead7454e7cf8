//! # Cache Facade Library
//!
//! Async facade over a Redis connection exposing CRUD-style cache
//! operations plus a health-check adapter.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │        CacheService          │   │    RedisHealthIndicator      │
//! │ (gated on connection state)  │   │   (PING raced vs timeout)    │
//! └──────────────────────────────┘   └──────────────────────────────┘
//!                │                                  │
//!                ▼                                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Primitive operations (ops)                  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │        RedisHandle  ──  Lifecycle  ──  ConnectionObserver       │
//! └─────────────────────────────────────────────────────────────────┘
//!                                  │
//!                                  ▼
//!                     redis::aio::ConnectionManager
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cache_facade::{CacheConfig, HealthIndicator};
//!
//! let stack = cache_facade::init(&CacheConfig::from_env()?).await?;
//!
//! stack.service.put("user:1", "ada", Some(Duration::from_secs(60))).await?;
//! let name = stack.service.get("user:1").await?;
//! let report = stack.health.report().await;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod ops;
pub mod service;

#[cfg(test)]
mod mock;

// Re-export commonly used types
pub use client::{
    CacheConnection, ConnectionObserver, ConnectionState, ReconnectMonitor, RedisHandle,
    SilentObserver, TracingObserver, connect, connect_with_config,
};
pub use config::{CacheConfig, ClientOptions, HealthConfig};
pub use error::{CacheError, CacheResult};
pub use health::{HealthIndicator, HealthRecord, HealthStatus, RedisHealthIndicator};
pub use service::{CacheService, GatePolicy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Facade, health indicator and reconnect monitor sharing one connection
pub struct CacheStack {
    pub service: CacheService,
    pub health: RedisHealthIndicator,
    monitor: Option<ReconnectMonitor>,
}

impl CacheStack {
    /// Stop background probing. The connection closes once the last handle drops.
    pub async fn shutdown(self) {
        self.service.handle().close();
        if let Some(monitor) = self.monitor {
            monitor.stop().await;
        }
    }
}

/// Connect and assemble the cache stack from configuration
///
/// # Errors
///
/// Returns an error if the initial Redis connection fails.
pub async fn init(config: &CacheConfig) -> CacheResult<CacheStack> {
    let handle = connect_with_config(config).await?;

    let monitor = (!config.reconnect_interval.is_zero())
        .then(|| ReconnectMonitor::spawn(handle.clone(), config.reconnect_interval));

    Ok(CacheStack {
        service: CacheService::with_policy(handle.clone(), config.gate),
        health: RedisHealthIndicator::with_config(handle, &config.health),
        monitor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
