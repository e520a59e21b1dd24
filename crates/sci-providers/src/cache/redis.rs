//! Redis cache provider.
//!
//! Connection is established lazily on first use through a shared
//! connection manager; `ping` doubles as the startup reachability probe
//! behind cache degradation.

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::CacheProvider;
use sci_domain::registry::cache::{CacheProviderConfig, CacheProviderEntry, CACHE_PROVIDERS};
use sci_domain::value_objects::CacheEntryConfig;
use tokio::sync::OnceCell;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 6379;

/// Cache provider backed by Redis.
pub struct RedisCacheProvider {
    url: String,
    connection: OnceCell<ConnectionManager>,
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("url", &self.url)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisCacheProvider {
    /// Create a provider against `redis://host:port`.
    #[must_use]
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            url: format!("redis://{host}:{port}"),
            connection: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let client = redis::Client::open(self.url.as_str())
                    .map_err(|e| Error::cache(format!("Invalid Redis URL: {e}")))?;
                ConnectionManager::new(client)
                    .await
                    .map_err(|e| Error::cache(format!("Redis connection failed: {e}")))
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get(key)
            .await
            .map_err(|e| Error::cache(format!("Redis GET failed: {e}")))
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let mut conn = self.connection().await?;
        match config.ttl {
            Some(ttl) => conn
                .set_ex(key, value, ttl.as_secs())
                .await
                .map_err(|e| Error::cache(format!("Redis SETEX failed: {e}"))),
            None => conn
                .set(key, value)
                .await
                .map_err(|e| Error::cache(format!("Redis SET failed: {e}"))),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn
            .del(key)
            .await
            .map_err(|e| Error::cache(format!("Redis DEL failed: {e}")))?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        conn.exists(key)
            .await
            .map_err(|e| Error::cache(format!("Redis EXISTS failed: {e}")))
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| Error::cache(format!("Redis PING failed: {e}")))
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

fn redis_factory(
    config: &CacheProviderConfig,
) -> std::result::Result<Arc<dyn CacheProvider>, String> {
    let host = config.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_owned());
    let port = config.port.unwrap_or(DEFAULT_PORT);
    Ok(Arc::new(RedisCacheProvider::new(&host, port)))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static REDIS_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "redis",
    description: "Redis key-value cache",
    build: redis_factory,
};
