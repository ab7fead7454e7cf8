//! # Health Check Adapter
//!
//! Pings the store under a deadline and reports the outcome as a loose
//! key-value record suitable for a health endpoint.

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::time::Duration;

use crate::client::{CacheConnection, RedisHandle};
use crate::config::HealthConfig;
use crate::error::{CacheError, CacheResult};
use crate::ops;

/// Service name reported when none is configured
pub const DEFAULT_SERVICE_NAME: &str = "mongo";

/// Ping deadline used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Free-form health record
pub type HealthRecord = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// A component that can report on its own health
#[async_trait]
pub trait HealthIndicator: Send + Sync {
    fn name(&self) -> &str;

    /// Probe the component, resolving with its raw reply
    async fn check(&self) -> CacheResult<String>;

    /// Attach `error` (if any) to `data` under the `"error"` key
    fn build(&self, mut data: HealthRecord, error: Option<&CacheError>) -> HealthRecord {
        if let Some(error) = error {
            data.insert("error".to_string(), Value::String(error.to_string()));
        }
        data
    }

    /// Run [`check`](Self::check) and summarise it
    async fn report(&self) -> HealthRecord {
        let mut data = HealthRecord::new();
        data.insert("service".to_string(), json!(self.name()));
        data.insert("checked_at".to_string(), json!(Utc::now().to_rfc3339()));

        match self.check().await {
            Ok(reply) => {
                data.insert("status".to_string(), json!(HealthStatus::Up));
                data.insert("reply".to_string(), json!(reply));
                self.build(data, None)
            }
            Err(e) => {
                tracing::warn!(service = %self.name(), error = %e, "Health check failed");
                data.insert("status".to_string(), json!(HealthStatus::Down));
                self.build(data, Some(&e))
            }
        }
    }
}

/// Health indicator backed by `PING`
#[derive(Debug, Clone)]
pub struct RedisHealthIndicator<C = ConnectionManager> {
    handle: RedisHandle<C>,
    service: String,
    timeout: Duration,
}

impl<C: CacheConnection> RedisHealthIndicator<C> {
    pub fn new(handle: RedisHandle<C>) -> Self {
        Self::with_config(handle, &HealthConfig::default())
    }

    pub fn with_config(handle: RedisHandle<C>, config: &HealthConfig) -> Self {
        Self {
            handle,
            service: config.service.clone(),
            timeout: config.timeout,
        }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn timeout_error(&self) -> CacheError {
        CacheError::Timeout {
            service: self.service.clone(),
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[async_trait]
impl<C: CacheConnection> HealthIndicator for RedisHealthIndicator<C> {
    fn name(&self) -> &str {
        &self.service
    }

    /// Ping, racing a timer unless the timeout is zero.
    ///
    /// Losing the race only stops waiting; the ping itself stays in flight.
    async fn check(&self) -> CacheResult<String> {
        let ping = ops::ping(&self.handle);
        if self.timeout.is_zero() {
            return ping.await;
        }

        tokio::time::timeout(self.timeout, ping)
            .await
            .unwrap_or_else(|_| Err(self.timeout_error()))
    }
}
