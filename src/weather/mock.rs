use super::types::*;
use super::weatherapi::{is_valid_days, WeatherApiError, WeatherOrigin};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;

/// Offline origin producing synthetic records.
///
/// Counts every call so cache behavior can be observed, and can be switched
/// into a failing mode to simulate provider outages.
pub struct MockWeatherClient {
    current_calls: AtomicUsize,
    forecast_calls: AtomicUsize,
    last_forecast_days: AtomicU32,
    failing: AtomicBool,
    forecast_gate: Option<Arc<Barrier>>,
}

impl MockWeatherClient {
    pub fn new() -> Self {
        Self {
            current_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
            last_forecast_days: AtomicU32::new(0),
            failing: AtomicBool::new(false),
            forecast_gate: None,
        }
    }
}

#[cfg_attr(not(test), allow(dead_code))]
impl MockWeatherClient {
    /// Every forecast fetch waits on `gate` before answering, so a test can
    /// hold several fetches in flight at once.
    pub fn with_forecast_gate(gate: Arc<Barrier>) -> Self {
        Self {
            forecast_gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    /// `days` of the most recent forecast call, 0 if none was made.
    pub fn last_forecast_days(&self) -> u32 {
        self.last_forecast_days.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl MockWeatherClient {
    fn check_available(&self) -> Result<(), WeatherApiError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WeatherApiError::Api {
                status: 503,
                code: None,
                message: "mock origin unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

fn mock_location(city: &str) -> Location {
    let now = Utc::now();
    Location {
        name: city.to_string(),
        region: String::new(),
        country: "Mockland".to_string(),
        localtime_epoch: now.timestamp(),
        localtime: now.format("%Y-%m-%d %H:%M").to_string(),
    }
}

fn mock_condition(rainy: bool) -> Condition {
    if rainy {
        Condition {
            text: "Light rain".to_string(),
            icon: "//cdn.weatherapi.com/weather/64x64/day/296.png".to_string(),
            code: 1183,
        }
    } else {
        Condition {
            text: "Sunny".to_string(),
            icon: "//cdn.weatherapi.com/weather/64x64/day/113.png".to_string(),
            code: 1000,
        }
    }
}

#[async_trait]
impl WeatherOrigin for MockWeatherClient {
    async fn fetch_current(&self, city: &str) -> Result<CurrentWeatherResponse, WeatherApiError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let temp_c = 12.0 + 8.0 * fastrand::f64();
        Ok(CurrentWeatherResponse {
            location: mock_location(city),
            current: CurrentConditions {
                temp_c,
                feels_like_c: temp_c - 1.5,
                condition: mock_condition(fastrand::f64() < 0.3),
                wind_kph: 5.0 + 20.0 * fastrand::f64(),
                humidity: (55.0 + 35.0 * fastrand::f64()).round(),
            },
        })
    }

    async fn fetch_forecast(
        &self,
        city: &str,
        days: u32,
    ) -> Result<ForecastWeatherResponse, WeatherApiError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        self.last_forecast_days.store(days, Ordering::SeqCst);
        if !is_valid_days(days) {
            return Err(WeatherApiError::InvalidDays(days));
        }
        self.check_available()?;
        if let Some(gate) = &self.forecast_gate {
            gate.wait().await;
        }

        let today = Utc::now().date_naive();
        let forecast_days = (0..days)
            .map(|day| {
                let base_temp = 10.0 + 4.0 * (day as f64 * 0.7).sin();
                ForecastDay {
                    date: (today + Duration::days(day as i64))
                        .format("%Y-%m-%d")
                        .to_string(),
                    day: DaySummary {
                        max_temp_c: base_temp + 3.0 + fastrand::f64(),
                        min_temp_c: base_temp - 3.0 - fastrand::f64(),
                        condition: mock_condition(day % 3 == 2),
                    },
                }
            })
            .collect();

        Ok(ForecastWeatherResponse {
            location: mock_location(city),
            forecast: Forecast { forecast_days },
        })
    }
}
