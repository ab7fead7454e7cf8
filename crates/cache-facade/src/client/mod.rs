//! # Client Module
//!
//! Connection handle, lifecycle tracking, and the factory that opens them.

pub mod factory;
pub mod handle;
pub mod lifecycle;
pub mod monitor;

pub use factory::{connect, connect_with_config};
pub use handle::{CacheConnection, RedisHandle};
pub use lifecycle::{
    ConnectionObserver, ConnectionState, Lifecycle, SilentObserver, TracingObserver,
};
pub use monitor::ReconnectMonitor;
