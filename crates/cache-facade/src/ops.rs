//! # Primitive Operations
//!
//! One async function per store command. Each issues a single command on
//! the handle and maps the reply to a plain Rust value; errors from the
//! client pass through unchanged.

use redis::Value;
use std::time::Duration;

use crate::client::{CacheConnection, RedisHandle};
use crate::error::{CacheError, CacheResult};

fn is_ok_reply(reply: &Value) -> bool {
    match reply {
        Value::Okay => true,
        Value::SimpleString(status) => status == "OK",
        _ => false,
    }
}

/// Raw `PING` reply
pub async fn ping<C: CacheConnection>(handle: &RedisHandle<C>) -> CacheResult<String> {
    handle.query(&redis::cmd("PING")).await
}

/// TTL in whole milliseconds, rounding any sub-millisecond part up
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

/// Store `value` under `key`; a zero or absent TTL stores without expiry.
///
/// The TTL is sent as `PX` milliseconds, so fractional seconds are kept.
/// Resolves `true` iff the server acknowledged with `OK`.
pub async fn set<C: CacheConnection>(
    handle: &RedisHandle<C>,
    key: &str,
    value: &str,
    ttl: Option<Duration>,
) -> CacheResult<bool> {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value);

    if let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) {
        cmd.arg("PX").arg(ttl_millis(ttl));
    }

    let reply: Value = handle.query(&cmd).await?;
    Ok(is_ok_reply(&reply))
}

/// Resolves `true` iff the key existed and its TTL was set.
///
/// A zero TTL is refused: the server would delete the key instead.
pub async fn expire<C: CacheConnection>(
    handle: &RedisHandle<C>,
    key: &str,
    ttl: Duration,
) -> CacheResult<bool> {
    if ttl.is_zero() {
        return Err(CacheError::InvalidTtl);
    }

    let updated: i64 = handle
        .query(redis::cmd("PEXPIRE").arg(key).arg(ttl_millis(ttl)))
        .await?;
    Ok(updated != 0)
}

pub async fn get<C: CacheConnection>(
    handle: &RedisHandle<C>,
    key: &str,
) -> CacheResult<Option<String>> {
    handle.query(redis::cmd("GET").arg(key)).await
}

/// Values positionally aligned with `keys`, `None` where a key is absent
pub async fn get_many<C, K>(handle: &RedisHandle<C>, keys: &[K]) -> CacheResult<Vec<Option<String>>>
where
    C: CacheConnection,
    K: AsRef<str> + Sync,
{
    // MGET with no keys is a server-side arity error
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut cmd = redis::cmd("MGET");
    for key in keys {
        cmd.arg(key.as_ref());
    }
    handle.query(&cmd).await
}

pub async fn exists<C: CacheConnection>(handle: &RedisHandle<C>, key: &str) -> CacheResult<bool> {
    let found: i64 = handle.query(redis::cmd("EXISTS").arg(key)).await?;
    Ok(found == 1)
}

/// Resolves `true` iff exactly one key was removed
pub async fn delete<C: CacheConnection>(handle: &RedisHandle<C>, key: &str) -> CacheResult<bool> {
    let removed: i64 = handle.query(redis::cmd("DEL").arg(key)).await?;
    Ok(removed == 1)
}

/// Flush the active logical database
pub async fn clear<C: CacheConnection>(handle: &RedisHandle<C>) -> CacheResult<bool> {
    tracing::debug!("Flushing active cache database");
    let reply: Value = handle.query(&redis::cmd("FLUSHDB")).await?;
    Ok(is_ok_reply(&reply))
}

/// Every key in the active database, unordered.
///
/// Issues `KEYS *`, which walks the whole keyspace on the server.
pub async fn keys<C: CacheConnection>(handle: &RedisHandle<C>) -> CacheResult<Vec<String>> {
    handle.query(redis::cmd("KEYS").arg("*")).await
}

pub async fn count<C: CacheConnection>(handle: &RedisHandle<C>) -> CacheResult<u64> {
    handle.query(&redis::cmd("DBSIZE")).await
}
