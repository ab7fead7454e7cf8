//! # Connection Handle
//!
//! Thin wrapper that routes every command through one connection and keeps
//! the lifecycle in step with what the transport reports.

use redis::aio::{ConnectionLike, ConnectionManager};
use redis::{Cmd, FromRedisValue};
use std::sync::Arc;

use super::lifecycle::{ConnectionObserver, ConnectionState, Lifecycle};
use crate::error::{CacheError, CacheResult};

/// Any async connection the handle can drive.
///
/// `ConnectionManager` is the production implementation. Tests plug in an
/// in-memory connection.
pub trait CacheConnection: ConnectionLike + Clone + Send + Sync + 'static {}

impl<T> CacheConnection for T where T: ConnectionLike + Clone + Send + Sync + 'static {}

/// Shared handle to the underlying store
#[derive(Clone)]
pub struct RedisHandle<C = ConnectionManager> {
    conn: C,
    lifecycle: Arc<Lifecycle>,
}

impl<C: CacheConnection> RedisHandle<C> {
    pub fn new(conn: C, initial: ConnectionState) -> Self {
        Self {
            conn,
            lifecycle: Arc::new(Lifecycle::new(initial)),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.lifecycle.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Register a lifecycle observer on this handle (and all its clones)
    pub fn subscribe(&self, observer: Arc<dyn ConnectionObserver>) {
        self.lifecycle.subscribe(observer);
    }

    /// Stop serving commands. Every clone of the handle is affected.
    pub fn close(&self) {
        self.lifecycle.close();
    }

    /// Run one command and decode its reply.
    ///
    /// A transport-level failure moves the handle to `Ended`. Any reply
    /// from the server moves it back to `Ready`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Closed` after [`close`](Self::close), otherwise
    /// the underlying client error unchanged.
    pub async fn query<T>(&self, cmd: &Cmd) -> CacheResult<T>
    where
        T: FromRedisValue + Send,
    {
        if self.lifecycle.is_closed() {
            return Err(CacheError::Closed);
        }

        let mut conn = self.conn.clone();
        match conn.req_packed_command(cmd).await {
            Ok(value) => {
                self.lifecycle.mark_ready();
                Ok(redis::from_owned_redis_value(value)?)
            }
            Err(err) => {
                self.lifecycle.report_error(&err);
                let err = CacheError::from(err);
                if err.is_connection_loss() {
                    self.lifecycle.mark_ended();
                }
                Err(err)
            }
        }
    }
}

impl<C> std::fmt::Debug for RedisHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisHandle")
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}
