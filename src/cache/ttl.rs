use crate::config::Config;
use crate::weather::{CURRENT_PATH, FORECAST_PATH};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Current,
    Forecast,
    /// Per-city max-days marker. Always shares the forecast TTL.
    ForecastMaxDays,
    Other,
}

impl DataKind {
    pub fn from_path(path: &str) -> Self {
        match path {
            CURRENT_PATH => DataKind::Current,
            FORECAST_PATH => DataKind::Forecast,
            _ => DataKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub current: Duration,
    pub forecast: Duration,
    pub fallback: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            current: Duration::from_secs(15 * 60),
            forecast: Duration::from_secs(60 * 60),
            fallback: Duration::from_secs(60),
        }
    }
}

impl TtlPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            current: Duration::from_secs(config.current_ttl_minutes * 60),
            forecast: Duration::from_secs(config.forecast_ttl_minutes * 60),
            fallback: Duration::from_secs(config.fallback_ttl_minutes * 60),
        }
    }

    pub fn ttl_for(&self, kind: DataKind) -> Duration {
        match kind {
            DataKind::Current => self.current,
            DataKind::Forecast | DataKind::ForecastMaxDays => self.forecast,
            DataKind::Other => self.fallback,
        }
    }

    pub fn ttl_for_path(&self, path: &str) -> Duration {
        self.ttl_for(DataKind::from_path(path))
    }
}
