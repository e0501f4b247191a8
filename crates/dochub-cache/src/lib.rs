//! # dochub-cache
//!
//! Cache provider implementations for DocHub and the read-through,
//! write-invalidate [`CacheLayer`] built on top of them.
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration. Only the
//! Redis provider is shared across instances.

pub mod keys;
pub mod layer;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use layer::CacheLayer;
pub use provider::CacheManager;
