use super::store::{CacheError, CacheStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;

/// Shared store backed by Redis. Values are kept as JSON strings under the
/// cache key as-is, so several instances of the service see the same entries.
pub struct RedisStore<T> {
    conn: ConnectionManager,
    _value: PhantomData<fn() -> T>,
}

impl<T> RedisStore<T> {
    /// Opens a managed connection. The manager reconnects on its own after
    /// the server drops it; failed commands surface as store errors.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = ConnectionManager::new(client).await.map_err(unavailable)?;
        Ok(Self::with_connection(conn))
    }

    /// Stores for different value types can share one connection manager.
    pub fn with_connection(conn: ConnectionManager) -> Self {
        Self {
            conn,
            _value: PhantomData,
        }
    }

    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

fn unavailable(e: redis::RedisError) -> CacheError {
    CacheError::Unavailable(e.to_string())
}

fn rejected(key: &str, reason: impl ToString) -> CacheError {
    CacheError::WriteRejected {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, CacheError> {
    serde_json::to_string(value).map_err(|e| rejected(key, e))
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, CacheError> {
    serde_json::from_str(raw)
        .map_err(|e| CacheError::Unavailable(format!("undecodable value under {}: {}", key, e)))
}

/// PEXPIRE takes whole milliseconds; anything shorter still gets one so the
/// key is not deleted outright.
fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1)
}

#[async_trait]
impl<T> CacheStore<T> for RedisStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<T>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await.map_err(unavailable)?;
        raw.map(|raw| decode(key, &raw)).transpose()
    }

    async fn set(&self, key: &str, value: T) -> Result<(), CacheError> {
        let payload = encode(key, &value)?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, payload)
            .await
            .map_err(|e| rejected(key, e))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        conn.pexpire(key, ttl_millis(ttl))
            .await
            .map_err(|e| rejected(key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::types::{Forecast, ForecastWeatherResponse, Location};

    fn sample_forecast() -> ForecastWeatherResponse {
        ForecastWeatherResponse {
            location: Location {
                name: "Gliwice".to_string(),
                region: "Silesia".to_string(),
                country: "Poland".to_string(),
                localtime_epoch: 1_700_000_000,
                localtime: "2023-11-14 23:13".to_string(),
            },
            forecast: Forecast {
                forecast_days: Vec::new(),
            },
        }
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let result = RedisStore::<u32>::connect("not a redis url").await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    #[test]
    fn test_values_are_stored_as_provider_json() {
        let payload = encode("/forecast.json?q=Gliwice&days=0", &sample_forecast()).unwrap();

        // Same field names the provider sends, so entries stay readable from redis-cli.
        assert!(payload.contains(r#""forecastday":[]"#));
        let back: ForecastWeatherResponse = decode("k", &payload).unwrap();
        assert_eq!(back, sample_forecast());
    }

    #[test]
    fn test_max_days_marker_is_plain_number() {
        assert_eq!(encode("Gliwice:maxDays", &7u32).unwrap(), "7");
        assert_eq!(decode::<u32>("Gliwice:maxDays", "7").unwrap(), 7);
    }

    #[test]
    fn test_undecodable_value_is_a_read_failure() {
        let err = decode::<u32>("Gliwice:maxDays", "seven").unwrap_err();
        assert!(matches!(err, CacheError::Unavailable(msg) if msg.contains("Gliwice:maxDays")));
    }

    #[test]
    fn test_ttl_millis_never_zero() {
        assert_eq!(ttl_millis(Duration::from_secs(60 * 60)), 3_600_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
    }

    #[tokio::test]
    #[ignore = "needs a Redis server at REDIS_URL"]
    async fn test_live_set_expire_get() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
        let store = RedisStore::<u32>::connect(&url).await.unwrap();
        let key = format!("weather-cache-server-test:{}", fastrand::u64(..));

        assert_eq!(store.get(&key).await.unwrap(), None);
        assert!(!store.expire(&key, Duration::from_secs(1)).await.unwrap());

        store.set(&key, 5).await.unwrap();
        assert!(store.expire(&key, Duration::from_millis(200)).await.unwrap());
        assert_eq!(store.get(&key).await.unwrap(), Some(5));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.get(&key).await.unwrap(), None);
    }
}
