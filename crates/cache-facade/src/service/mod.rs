//! # Service Module
//!
//! The cache facade and the policy that gates it on connection state.

pub mod cache_service;
pub mod gate;

pub use cache_service::CacheService;
pub use gate::{GatePolicy, Operation};
