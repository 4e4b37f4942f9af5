use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;
use tracing::info;

use super::{CacheError, SessionCache};

/// Redis-backed session cache sharing one multiplexed connection
#[derive(Clone)]
pub struct RedisSessionCache {
    manager: ConnectionManager,
    timeout: Duration,
}

impl RedisSessionCache {
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let manager = bounded(timeout, ConnectionManager::new(client)).await?;
        let cache = Self { manager, timeout };

        let mut conn = cache.manager.clone();
        let pong: String = bounded(timeout, redis::cmd("PING").query_async::<_, String>(&mut conn)).await?;
        info!("Connected to session cache ({})", pong);
        Ok(cache)
    }
}

async fn bounded<T, F>(deadline: Duration, fut: F) -> Result<T, CacheError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CacheError::Timeout(deadline)),
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        bounded(
            self.timeout,
            redis::cmd("GET").arg(key).query_async::<_, Option<String>>(&mut conn),
        )
        .await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        bounded(
            self.timeout,
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(ttl.as_secs().max(1))
                .query_async::<_, ()>(&mut conn),
        )
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _removed: i64 = bounded(
            self.timeout,
            redis::cmd("DEL").arg(key).query_async::<_, i64>(&mut conn),
        )
        .await?;
        Ok(())
    }
}
