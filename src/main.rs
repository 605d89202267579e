use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod config;
mod routes;
mod service;
mod weather;

use config::Config;
use routes::{create_router, AppState};
use service::WeatherService;
use weather::mock::MockWeatherClient;
use weather::weatherapi::{WeatherApiClient, WeatherOrigin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_cache_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let origin: Arc<dyn WeatherOrigin> = if config.use_mock_origin {
        tracing::warn!("WEATHER_MOCK is set, serving synthetic weather data");
        Arc::new(MockWeatherClient::new())
    } else {
        Arc::new(WeatherApiClient::new(&config)?)
    };

    let weather = Arc::new(WeatherService::from_config(&config, origin).await?);
    match &config.redis_url {
        Some(_) => tracing::info!("Caching in Redis"),
        None => tracing::info!("Caching in process memory"),
    }
    tracing::info!("Tracking cities: {}", config.tracked_cities.join(", "));

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        config: Arc::new(config),
        weather,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
