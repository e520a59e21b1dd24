//! Cache providers.

/// Moka in-memory cache
pub mod moka;
/// Always-miss cache
pub mod null;
/// Redis KV cache
pub mod redis;

pub use moka::MokaCacheProvider;
pub use null::NullCacheProvider;
pub use redis::RedisCacheProvider;
