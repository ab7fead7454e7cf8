//! # Cache Facade
//!
//! CRUD-style cache API over a [`RedisHandle`], switched on and off by the
//! handle's lifecycle.

use redis::aio::ConnectionManager;
use std::time::Duration;

use super::gate::{GatePolicy, Operation};
use crate::client::{CacheConnection, RedisHandle};
use crate::error::{CacheError, CacheResult};
use crate::ops;

/// Cache facade over a shared connection handle.
///
/// The facade is enabled exactly while its handle is `Ready`, so it
/// follows every lifecycle transition the handle goes through.
#[derive(Debug, Clone)]
pub struct CacheService<C = ConnectionManager> {
    handle: RedisHandle<C>,
    policy: GatePolicy,
}

impl<C: CacheConnection> CacheService<C> {
    /// Wrap a handle with the default [`GatePolicy::Uniform`]
    pub fn new(handle: RedisHandle<C>) -> Self {
        Self::with_policy(handle, GatePolicy::default())
    }

    pub const fn with_policy(handle: RedisHandle<C>, policy: GatePolicy) -> Self {
        Self { handle, policy }
    }

    pub fn is_enabled(&self) -> bool {
        self.handle.is_ready()
    }

    pub const fn policy(&self) -> GatePolicy {
        self.policy
    }

    pub const fn handle(&self) -> &RedisHandle<C> {
        &self.handle
    }

    /// `Ok(true)` lets `op` reach the store. A gated read resolves
    /// `Ok(false)`; a gated write fails with `Unavailable`.
    fn gate(&self, op: Operation) -> CacheResult<bool> {
        if !self.policy.gates(op) || self.is_enabled() {
            return Ok(true);
        }

        tracing::debug!(operation = ?op, "Cache disabled, skipping store");
        if op.is_write() {
            Err(CacheError::Unavailable)
        } else {
            Ok(false)
        }
    }

    /// Store a value, optionally with a TTL rounded up to whole milliseconds
    ///
    /// # Errors
    ///
    /// `CacheError::Unavailable` while disabled, otherwise client errors.
    pub async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<bool> {
        self.gate(Operation::Put)?;
        ops::set(&self.handle, key, value, ttl).await
    }

    /// Set a TTL on an existing key
    ///
    /// # Errors
    ///
    /// `CacheError::Unavailable` when gated, `CacheError::InvalidTtl` for a
    /// zero TTL, otherwise client errors.
    pub async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        self.gate(Operation::Expire)?;
        ops::expire(&self.handle, key, ttl).await
    }

    /// Get a value; resolves `None` while disabled
    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        if !self.gate(Operation::Get)? {
            return Ok(None);
        }
        ops::get(&self.handle, key).await
    }

    /// Get several values; all `None` while disabled
    pub async fn get_many<K>(&self, keys: &[K]) -> CacheResult<Vec<Option<String>>>
    where
        K: AsRef<str> + Sync,
    {
        if !self.gate(Operation::GetMany)? {
            return Ok(vec![None; keys.len()]);
        }
        ops::get_many(&self.handle, keys).await
    }

    pub async fn contains_key(&self, key: &str) -> CacheResult<bool> {
        if !self.gate(Operation::ContainsKey)? {
            return Ok(false);
        }
        ops::exists(&self.handle, key).await
    }

    /// Remove a key
    ///
    /// # Errors
    ///
    /// `CacheError::Unavailable` when gated, otherwise client errors.
    pub async fn remove(&self, key: &str) -> CacheResult<bool> {
        self.gate(Operation::Remove)?;
        ops::delete(&self.handle, key).await
    }

    /// Flush the active database
    ///
    /// # Errors
    ///
    /// `CacheError::Unavailable` when gated, otherwise client errors.
    pub async fn clear(&self) -> CacheResult<bool> {
        self.gate(Operation::Clear)?;
        ops::clear(&self.handle).await
    }

    pub async fn keys(&self) -> CacheResult<Vec<String>> {
        if !self.gate(Operation::Keys)? {
            return Ok(Vec::new());
        }
        ops::keys(&self.handle).await
    }

    pub async fn count(&self) -> CacheResult<u64> {
        if !self.gate(Operation::Count)? {
            return Ok(0);
        }
        ops::count(&self.handle).await
    }
}
