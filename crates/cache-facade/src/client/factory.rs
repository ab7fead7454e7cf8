//! # Client Factory
//!
//! Opens a managed Redis connection and wires lifecycle logging onto it.

use redis::aio::ConnectionManager;
use redis::{Client, ConnectionInfo, IntoConnectionInfo, RedisError};
use std::sync::Arc;

use super::handle::RedisHandle;
use super::lifecycle::{ConnectionObserver, ConnectionState, TracingObserver};
use crate::config::{CacheConfig, ClientOptions};
use crate::error::CacheResult;

/// Open a connection handle.
///
/// The observer is subscribed before the first connect attempt, so it sees
/// the initial `on_ready` or the `on_error` of a failed attempt. No retries
/// are made here; `ConnectionManager` reconnects on its own once established.
///
/// # Errors
///
/// Returns the client error if the URL cannot be parsed or the initial
/// connection fails.
pub async fn connect(
    url: &str,
    options: &ClientOptions,
    observer: Arc<dyn ConnectionObserver>,
) -> CacheResult<RedisHandle> {
    let conn = match open(url, options).await {
        Ok(conn) => conn,
        Err(err) => {
            observer.on_error(&err);
            return Err(err.into());
        }
    };

    let handle = RedisHandle::new(conn, ConnectionState::Ended);
    handle.subscribe(observer);
    handle.lifecycle().mark_ready();

    Ok(handle)
}

/// Open a connection handle from configuration, logging through `tracing`
///
/// # Errors
///
/// See [`connect`].
pub async fn connect_with_config(config: &CacheConfig) -> CacheResult<RedisHandle> {
    let observer = Arc::new(TracingObserver::new(config.url.clone()));
    connect(&config.url, &config.options, observer).await
}

async fn open(url: &str, options: &ClientOptions) -> Result<ConnectionManager, RedisError> {
    let info = connection_info(url, options)?;
    let client = Client::open(info)?;
    ConnectionManager::new(client).await
}

fn connection_info(url: &str, options: &ClientOptions) -> Result<ConnectionInfo, RedisError> {
    let mut info = url.into_connection_info()?;

    if let Some(db) = options.database {
        info.redis.db = db;
    }
    if let Some(username) = &options.username {
        info.redis.username = Some(username.clone());
    }
    if let Some(password) = &options.password {
        info.redis.password = Some(password.clone());
    }

    Ok(info)
}
