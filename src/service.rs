use crate::cache::current::CurrentWeatherCache;
use crate::cache::forecast::ForecastCacheCoordinator;
use crate::cache::redis_store::RedisStore;
use crate::cache::store::{CacheError, MokaStore};
use crate::cache::ttl::TtlPolicy;
use crate::config::Config;
use crate::weather::types::{CurrentWeatherResponse, ForecastWeatherResponse};
use crate::weather::weatherapi::{WeatherApiError, WeatherOrigin};
use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;

/// Per-city lookups of the all-cities calls run at most this many at once.
const MAX_CONCURRENT_CITIES: usize = 8;

/// Entry point used by the HTTP layer: cached single-city lookups plus the
/// all-tracked-cities aggregates.
pub struct WeatherService {
    current: Arc<CurrentWeatherCache>,
    forecast: Arc<ForecastCacheCoordinator>,
    cities: Vec<String>,
}

impl WeatherService {
    pub fn new(
        current: CurrentWeatherCache,
        forecast: ForecastCacheCoordinator,
        cities: Vec<String>,
    ) -> Self {
        Self {
            current: Arc::new(current),
            forecast: Arc::new(forecast),
            cities,
        }
    }

    /// Picks the store backend from `config`: Redis when `REDIS_URL` is set,
    /// otherwise in-process moka caches.
    pub async fn from_config(
        config: &Config,
        origin: Arc<dyn WeatherOrigin>,
    ) -> Result<Self, CacheError> {
        match config.redis_url.as_deref() {
            Some(url) => Self::with_redis_stores(config, url, origin).await,
            None => Ok(Self::with_moka_stores(config, origin)),
        }
    }

    /// Wire both caches to one shared Redis connection.
    pub async fn with_redis_stores(
        config: &Config,
        url: &str,
        origin: Arc<dyn WeatherOrigin>,
    ) -> Result<Self, CacheError> {
        let ttl = TtlPolicy::from_config(config);

        let current_store: RedisStore<CurrentWeatherResponse> = RedisStore::connect(url).await?;
        let conn = current_store.connection();
        let forecast_store: RedisStore<ForecastWeatherResponse> =
            RedisStore::with_connection(conn.clone());
        let max_days_store: RedisStore<u32> = RedisStore::with_connection(conn);

        let current = CurrentWeatherCache::new(Arc::new(current_store), origin.clone(), ttl);
        let forecast = ForecastCacheCoordinator::new(
            Arc::new(forecast_store),
            Arc::new(max_days_store),
            origin,
            ttl,
        );

        Ok(Self::new(current, forecast, config.tracked_cities.clone()))
    }

    /// Wire both caches to in-process stores sized and timed from `config`.
    pub fn with_moka_stores(config: &Config, origin: Arc<dyn WeatherOrigin>) -> Self {
        let ttl = TtlPolicy::from_config(config);
        let capacity = config.cache_max_capacity;

        let current_store: MokaStore<CurrentWeatherResponse> =
            MokaStore::new("current_weather", capacity);
        let forecast_store: MokaStore<ForecastWeatherResponse> =
            MokaStore::new("forecast_weather", capacity);
        let max_days_store: MokaStore<u32> = MokaStore::new("forecast_max_days", capacity);

        let current = CurrentWeatherCache::new(Arc::new(current_store), origin.clone(), ttl);
        let forecast = ForecastCacheCoordinator::new(
            Arc::new(forecast_store),
            Arc::new(max_days_store),
            origin,
            ttl,
        );

        Self::new(current, forecast, config.tracked_cities.clone())
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub async fn realtime_weather(
        &self,
        city: &str,
    ) -> Result<CurrentWeatherResponse, WeatherApiError> {
        self.current.get_current(city).await
    }

    pub async fn forecast_weather(
        &self,
        city: &str,
        days: u32,
    ) -> Result<ForecastWeatherResponse, WeatherApiError> {
        self.forecast.get_forecast(city, days).await
    }

    /// Current weather for every tracked city, yielded as each lookup completes.
    pub fn realtime_weather_all(
        &self,
    ) -> impl Stream<Item = Result<CurrentWeatherResponse, WeatherApiError>> + Send + 'static {
        let current = self.current.clone();
        stream::iter(self.cities.clone())
            .map(move |city| {
                let current = current.clone();
                async move { current.get_current(&city).await }
            })
            .buffer_unordered(MAX_CONCURRENT_CITIES)
    }

    /// `days`-day forecast for every tracked city, yielded as each lookup completes.
    pub fn forecast_weather_all(
        &self,
        days: u32,
    ) -> impl Stream<Item = Result<ForecastWeatherResponse, WeatherApiError>> + Send + 'static {
        let forecast = self.forecast.clone();
        stream::iter(self.cities.clone())
            .map(move |city| {
                let forecast = forecast.clone();
                async move { forecast.get_forecast(&city, days).await }
            })
            .buffer_unordered(MAX_CONCURRENT_CITIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::mock::MockWeatherClient;
    use futures::TryStreamExt;

    fn service() -> (WeatherService, Arc<MockWeatherClient>) {
        let origin = Arc::new(MockWeatherClient::new());
        let service = WeatherService::with_moka_stores(&Config::for_tests(), origin.clone());
        (service, origin)
    }

    #[tokio::test]
    async fn test_realtime_all_covers_every_city() {
        let (service, origin) = service();

        let records: Vec<_> = service.realtime_weather_all().try_collect().await.unwrap();

        let mut names: Vec<_> = records.iter().map(|r| r.location.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["Gliwice", "Hamburg"]);
        assert_eq!(origin.current_calls(), 2);
    }

    #[tokio::test]
    async fn test_forecast_all_reuses_cached_windows() {
        let (service, origin) = service();

        let week: Vec<_> = service.forecast_weather_all(7).try_collect().await.unwrap();
        let three: Vec<_> = service.forecast_weather_all(3).try_collect().await.unwrap();

        assert!(week.iter().all(|f| f.day_count() == 7));
        assert!(three.iter().all(|f| f.day_count() == 3));
        assert_eq!(origin.forecast_calls(), 2);
    }

    #[tokio::test]
    async fn test_single_city_shares_cache_with_aggregate() {
        let (service, origin) = service();
        service.forecast_weather("Gliwice", 5).await.unwrap();

        let all: Vec<_> = service.forecast_weather_all(5).try_collect().await.unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(origin.forecast_calls(), 2);
    }

    #[tokio::test]
    async fn test_from_config_defaults_to_in_process_stores() {
        let origin = Arc::new(MockWeatherClient::new());
        let service = WeatherService::from_config(&Config::for_tests(), origin.clone())
            .await
            .unwrap();

        service.forecast_weather("Gliwice", 4).await.unwrap();
        service.forecast_weather("Gliwice", 2).await.unwrap();
        assert_eq!(origin.forecast_calls(), 1);
    }

    #[tokio::test]
    async fn test_from_config_reports_bad_redis_url() {
        let config = Config {
            redis_url: Some("definitely not a url".to_string()),
            ..Config::for_tests()
        };
        let origin = Arc::new(MockWeatherClient::new());

        let result = WeatherService::from_config(&config, origin).await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_aggregate_fails_when_origin_fails() {
        let (service, origin) = service();
        origin.set_failing(true);

        let result: Result<Vec<_>, _> = service.realtime_weather_all().try_collect().await;

        assert!(result.is_err());
    }
}
