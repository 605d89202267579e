pub mod mock;
pub mod types;
pub mod weatherapi;

/// Provider path for current conditions. Also the data-kind tag for cache keys and TTLs.
pub const CURRENT_PATH: &str = "/current.json";
/// Provider path for multi-day forecasts.
pub const FORECAST_PATH: &str = "/forecast.json";
/// Largest `days` value the provider accepts.
pub const MAX_FORECAST_DAYS: u32 = 14;
