use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failure reported by a store backend. The in-process store never fails.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
    #[error("Cache write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },
}

/// Key/value store with per-key TTL.
///
/// `get` on a missing or expired key returns `Ok(None)`. `set` stores the
/// value with no TTL; a following `expire` arms the deadline. The two are
/// separate calls and are not atomic.
#[async_trait]
pub trait CacheStore<T>: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<T>, CacheError>;

    async fn set(&self, key: &str, value: T) -> Result<(), CacheError>;

    /// Returns `false` when the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError>;
}

#[derive(Clone, Debug)]
struct StoredEntry<T> {
    value: T,
    ttl: Option<Duration>,
}

/// Each write carries its own TTL, so `set` clears any previous deadline and
/// `expire` re-arms it from the moment it is called.
struct EntryExpiry;

impl<T> Expiry<String, StoredEntry<T>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredEntry<T>,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredEntry<T>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-process store backed by a moka cache.
pub struct MokaStore<T: Clone + Send + Sync + 'static> {
    cache: Cache<String, StoredEntry<T>>,
}

impl<T: Clone + Send + Sync + 'static> MokaStore<T> {
    pub fn new(name: &str, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .name(name)
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> CacheStore<T> for MokaStore<T> {
    async fn get(&self, key: &str) -> Result<Option<T>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: T) -> Result<(), CacheError> {
        self.cache
            .insert(key.to_string(), StoredEntry { value, ttl: None })
            .await;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        match self.cache.get(key).await {
            Some(entry) => {
                self.cache
                    .insert(
                        key.to_string(),
                        StoredEntry {
                            value: entry.value,
                            ttl: Some(ttl),
                        },
                    )
                    .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
