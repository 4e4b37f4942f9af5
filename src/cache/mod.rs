//! Session cache: one authoritative access token per identity.
//!
//! The gate compares the presented bearer token against the value stored under
//! [`session_key`]; a newer sign-in overwrites it and so retires older tokens.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod memory;
pub mod redis_cache;

pub use self::memory::MemorySessionCache;
pub use self::redis_cache::RedisSessionCache;

/// Fixed session lifetime. Reads never extend it.
pub const SESSION_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache operation exceeded {0:?} deadline")]
    Timeout(Duration),

    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

pub fn session_key(identity: &str) -> String {
    format!("user:{}:access_token", identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_format() {
        assert_eq!(session_key("ani@example.com"), "user:ani@example.com:access_token");
    }
}
