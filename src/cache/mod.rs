pub mod current;
pub mod forecast;
pub mod key;
pub mod redis_store;
pub mod store;
pub mod ttl;

use std::time::Duration;
use store::{CacheError, CacheStore};

/// Store reads fail open: a broken store is logged and treated as a miss.
pub(crate) async fn read_or_miss<T>(store: &dyn CacheStore<T>, key: &str) -> Option<T> {
    match store.get(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Cache read failed for key {}, treating as miss: {}", key, e);
            None
        }
    }
}

/// `set` followed by `expire`. Either step failing is reported as a write failure.
pub(crate) async fn write_with_ttl<T>(
    store: &dyn CacheStore<T>,
    key: &str,
    value: T,
    ttl: Duration,
) -> Result<(), CacheError> {
    store.set(key, value).await?;
    store.expire(key, ttl).await?;
    Ok(())
}
