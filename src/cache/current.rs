use super::key::current_key;
use super::store::CacheStore;
use super::ttl::TtlPolicy;
use super::{read_or_miss, write_with_ttl};
use crate::weather::types::CurrentWeatherResponse;
use crate::weather::weatherapi::{WeatherApiError, WeatherOrigin};
use crate::weather::CURRENT_PATH;
use std::sync::Arc;

/// Cache-aside wrapper for current conditions.
pub struct CurrentWeatherCache {
    store: Arc<dyn CacheStore<CurrentWeatherResponse>>,
    origin: Arc<dyn WeatherOrigin>,
    ttl: TtlPolicy,
}

impl CurrentWeatherCache {
    pub fn new(
        store: Arc<dyn CacheStore<CurrentWeatherResponse>>,
        origin: Arc<dyn WeatherOrigin>,
        ttl: TtlPolicy,
    ) -> Self {
        Self { store, origin, ttl }
    }

    pub async fn get_current(&self, city: &str) -> Result<CurrentWeatherResponse, WeatherApiError> {
        let key = current_key(city);

        if let Some(cached) = read_or_miss(self.store.as_ref(), &key).await {
            tracing::debug!("Cache hit for key: {}", key);
            return Ok(cached);
        }

        tracing::debug!("Cache miss for key: {}", key);
        let current = self.origin.fetch_current(city).await?;

        let ttl = self.ttl.ttl_for_path(CURRENT_PATH);
        if let Err(e) = write_with_ttl(self.store.as_ref(), &key, current.clone(), ttl).await {
            tracing::warn!("Failed to cache current weather for {}: {}", city, e);
        }

        Ok(current)
    }
}
