//! Forecast cache with max-days extension.
//!
//! For every city the coordinator remembers the largest `days` window it has
//! fetched (`<city>:maxDays`, same TTL as the forecasts). A request for
//! `days <= maxDays` is served by truncating the cached `maxDays` forecast,
//! so shorter windows never reach the provider while the larger one is cached.
//!
//! The marker is raised before the upstream call and is not rolled back when
//! that call fails, and the marker and the forecast expire independently. A
//! marker can therefore point at a forecast that is no longer cached; such a
//! claim is detected on read and handled as a miss.

use super::key::{forecast_key, max_days_key};
use super::store::CacheStore;
use super::ttl::{DataKind, TtlPolicy};
use super::{read_or_miss, write_with_ttl};
use crate::weather::types::ForecastWeatherResponse;
use crate::weather::weatherapi::{WeatherApiError, WeatherOrigin};
use crate::weather::FORECAST_PATH;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const CITY_LOCK_CAPACITY: u64 = 10_000;
const CITY_LOCK_IDLE: Duration = Duration::from_secs(10 * 60);

pub struct ForecastCacheCoordinator {
    forecasts: Arc<dyn CacheStore<ForecastWeatherResponse>>,
    max_days: Arc<dyn CacheStore<u32>>,
    origin: Arc<dyn WeatherOrigin>,
    ttl: TtlPolicy,
    /// Serializes the max-days read-modify-write per city. Never held across
    /// an upstream call, so concurrent misses are still fetched independently.
    city_locks: Cache<String, Arc<Mutex<()>>>,
}

impl ForecastCacheCoordinator {
    pub fn new(
        forecasts: Arc<dyn CacheStore<ForecastWeatherResponse>>,
        max_days: Arc<dyn CacheStore<u32>>,
        origin: Arc<dyn WeatherOrigin>,
        ttl: TtlPolicy,
    ) -> Self {
        let city_locks = Cache::builder()
            .name("forecast_city_locks")
            .max_capacity(CITY_LOCK_CAPACITY)
            .time_to_idle(CITY_LOCK_IDLE)
            .build();

        Self {
            forecasts,
            max_days,
            origin,
            ttl,
            city_locks,
        }
    }

    pub async fn get_forecast(
        &self,
        city: &str,
        days: u32,
    ) -> Result<ForecastWeatherResponse, WeatherApiError> {
        if days == 0 {
            return Err(WeatherApiError::InvalidDays(days));
        }

        let max_fetched = self.max_days(city).await;
        if max_fetched >= days {
            let full_key = forecast_key(city, max_fetched);
            if let Some(mut full) = read_or_miss(self.forecasts.as_ref(), &full_key).await {
                tracing::debug!("Serving {} days for {} from key: {}", days, city, full_key);
                full.truncate_days(days as usize);
                return Ok(full);
            }

            tracing::debug!(
                "maxDays for {} claims {} days but {} is not cached",
                city,
                max_fetched,
                full_key
            );
            let key = forecast_key(city, days);
            if let Some(cached) = read_or_miss(self.forecasts.as_ref(), &key).await {
                tracing::debug!("Cache hit for key: {}", key);
                return Ok(cached);
            }
        }

        let key = forecast_key(city, days);
        tracing::debug!("Cache miss for key: {}", key);
        self.raise_max_days(city, days).await;

        let forecast = self.origin.fetch_forecast(city, days).await?;

        let ttl = self.ttl.ttl_for_path(FORECAST_PATH);
        if let Err(e) = write_with_ttl(self.forecasts.as_ref(), &key, forecast.clone(), ttl).await {
            tracing::warn!("Failed to cache {}-day forecast for {}: {}", days, city, e);
        }

        Ok(forecast)
    }

    /// Largest forecast window recorded for `city`, 0 when unknown.
    pub async fn max_days(&self, city: &str) -> u32 {
        read_or_miss(self.max_days.as_ref(), &max_days_key(city))
            .await
            .unwrap_or(0)
    }

    /// Raise the marker to `days` if it is lower. Never lowers it.
    async fn raise_max_days(&self, city: &str, days: u32) {
        let lock = self
            .city_locks
            .get_with(city.to_string(), async { Arc::new(Mutex::new(())) })
            .await;
        let _guard = lock.lock().await;

        let meta_key = max_days_key(city);
        let old_max = self.max_days(city).await;
        if days <= old_max {
            return;
        }

        let ttl = self.ttl.ttl_for(DataKind::ForecastMaxDays);
        match write_with_ttl(self.max_days.as_ref(), &meta_key, days, ttl).await {
            Ok(()) => tracing::debug!("maxDays for {} raised {} -> {}", city, old_max, days),
            Err(e) => tracing::warn!("Failed to record maxDays={} for {}: {}", days, city, e),
        }
    }
}
