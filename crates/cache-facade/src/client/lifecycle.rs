//! # Connection Lifecycle
//!
//! Tracks whether a connection is usable and fans state transitions out to
//! registered observers.

use redis::RedisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Observable connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Commands can be served
    Ready,
    /// Transport dropped or handle closed
    Ended,
}

/// Receives connection lifecycle signals.
///
/// Every method has an empty default so implementors only override the
/// signals they care about.
pub trait ConnectionObserver: Send + Sync {
    fn on_ready(&self) {}

    fn on_end(&self) {}

    fn on_error(&self, _error: &RedisError) {}
}

/// Default observer: writes lifecycle signals to `tracing`
#[derive(Debug, Clone)]
pub struct TracingObserver {
    url: String,
}

impl TracingObserver {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ConnectionObserver for TracingObserver {
    fn on_ready(&self) {
        tracing::info!(url = %self.url, "Redis connected");
    }

    fn on_end(&self) {
        tracing::warn!(url = %self.url, "Redis disconnected");
    }

    fn on_error(&self, error: &RedisError) {
        tracing::warn!(url = %self.url, error = %error, "Redis error");
    }
}

/// Observer that discards every signal
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl ConnectionObserver for SilentObserver {}

/// Shared lifecycle state for one connection handle
pub struct Lifecycle {
    ready: AtomicBool,
    closed: AtomicBool,
    // Held across state change and notification so observers see
    // transitions in the order they happened
    transition: Mutex<()>,
    observers: RwLock<Vec<Arc<dyn ConnectionObserver>>>,
}

impl Lifecycle {
    pub fn new(initial: ConnectionState) -> Self {
        Self {
            ready: AtomicBool::new(initial == ConnectionState::Ready),
            closed: AtomicBool::new(false),
            transition: Mutex::new(()),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.ready.load(Ordering::SeqCst) {
            ConnectionState::Ready
        } else {
            ConnectionState::Ended
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Register an observer for all future transitions
    pub fn subscribe(&self, observer: Arc<dyn ConnectionObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Transition to `Ready`. Observers fire only if the state changed.
    ///
    /// Observers must not call `mark_ready`/`mark_ended` themselves.
    pub fn mark_ready(&self) {
        let _transition = self.lock_transition();
        if self.is_closed() {
            return;
        }
        if !self.ready.swap(true, Ordering::SeqCst) {
            for observer in self.snapshot() {
                observer.on_ready();
            }
        }
    }

    /// Transition to `Ended`. Observers fire only if the state changed.
    pub fn mark_ended(&self) {
        let _transition = self.lock_transition();
        if self.ready.swap(false, Ordering::SeqCst) {
            for observer in self.snapshot() {
                observer.on_end();
            }
        }
    }

    pub fn report_error(&self, error: &RedisError) {
        for observer in self.snapshot() {
            observer.on_error(error);
        }
    }

    /// Permanently end the lifecycle; later `mark_ready` calls are ignored
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.mark_ended();
    }

    fn lock_transition(&self) -> std::sync::MutexGuard<'_, ()> {
        self.transition.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Observers run outside the observer lock so they may subscribe further observers.
    fn snapshot(&self) -> Vec<Arc<dyn ConnectionObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("state", &self.state())
            .field("closed", &self.is_closed())
            .field("observers", &self.snapshot().len())
            .finish()
    }
}
