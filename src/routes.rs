use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::Config,
    service::WeatherService,
    weather::{
        types::{CurrentWeatherResponse, ForecastWeatherResponse},
        weatherapi::{is_valid_days, WeatherApiError},
    },
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather: Arc<WeatherService>,
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub city: String,
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastAllQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub tracked_cities: Vec<String>,
}

fn status_for(error: &WeatherApiError) -> StatusCode {
    match error {
        WeatherApiError::InvalidDays(_) => StatusCode::BAD_REQUEST,
        // 1006: no location matched the query
        WeatherApiError::Api { code: Some(1006), .. } => StatusCode::NOT_FOUND,
        WeatherApiError::Api { status: 400, .. } => StatusCode::BAD_REQUEST,
        WeatherApiError::RequestFailed(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn resolve_days(requested: Option<u32>, config: &Config) -> Result<u32, StatusCode> {
    let days = requested.unwrap_or(config.default_forecast_days);
    if is_valid_days(days) {
        Ok(days)
    } else {
        Err(StatusCode::BAD_REQUEST)
    }
}

fn validate_city(city: &str) -> Result<&str, StatusCode> {
    let city = city.trim();
    if city.is_empty() {
        Err(StatusCode::BAD_REQUEST)
    } else {
        Ok(city)
    }
}

// Route handlers
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tracked_cities: state.weather.cities().to_vec(),
    })
}

pub async fn realtime_weather_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<CurrentWeatherResponse>>, StatusCode> {
    match state.weather.realtime_weather_all().try_collect::<Vec<_>>().await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            tracing::error!("Realtime weather for tracked cities failed: {}", e);
            Err(status_for(&e))
        }
    }
}

pub async fn forecast_weather_all(
    State(state): State<AppState>,
    Query(params): Query<ForecastAllQuery>,
) -> Result<Json<Vec<ForecastWeatherResponse>>, StatusCode> {
    let days = resolve_days(params.days, &state.config)?;

    match state.weather.forecast_weather_all(days).try_collect::<Vec<_>>().await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            tracing::error!("{}-day forecast for tracked cities failed: {}", days, e);
            Err(status_for(&e))
        }
    }
}

pub async fn realtime_for_city(
    State(state): State<AppState>,
    Query(params): Query<CityQuery>,
) -> Result<Json<CurrentWeatherResponse>, StatusCode> {
    let city = validate_city(&params.city)?;

    match state.weather.realtime_weather(city).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::error!("Realtime weather for {} failed: {}", city, e);
            Err(status_for(&e))
        }
    }
}

pub async fn forecast_for_city(
    State(state): State<AppState>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<ForecastWeatherResponse>, StatusCode> {
    let city = validate_city(&params.city)?;
    let days = resolve_days(params.days, &state.config)?;

    match state.weather.forecast_weather(city, days).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::error!("{}-day forecast for {} failed: {}", days, city, e);
            Err(status_for(&e))
        }
    }
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/realtime-weather", get(realtime_weather_all))
        .route("/forecast-weather", get(forecast_weather_all))
        .route("/realtime", get(realtime_for_city))
        .route("/forecast", get(forecast_for_city))
        .with_state(state)
}
