//! Implementations of the permission cache port.

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use in_memory::InMemoryPermissionCache;
#[cfg(feature = "redis")]
pub use self::redis::RedisPermissionCache;
