use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub weather_api_key: String,
    pub weather_base_url: String,
    pub use_mock_origin: bool,
    pub tracked_cities: Vec<String>,
    pub default_forecast_days: u32,
    pub current_ttl_minutes: u64,
    pub forecast_ttl_minutes: u64,
    pub fallback_ttl_minutes: u64,
    pub cache_max_capacity: u64,
    /// Shared Redis store. The in-process store is used when unset.
    pub redis_url: Option<String>,
    pub http_timeout_secs: u64,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_mock_origin = parse_or(&lookup, "WEATHER_MOCK", false)?;
        let weather_api_key = match lookup("WEATHER_API_KEY") {
            Some(key) if !key.trim().is_empty() => key,
            _ if use_mock_origin => String::new(),
            _ => anyhow::bail!("WEATHER_API_KEY not set"),
        };

        let tracked_cities: Vec<String> = lookup("TRACKED_CITIES")
            .unwrap_or_else(|| "Gliwice,Hamburg".to_string())
            .split(',')
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty())
            .collect();
        if tracked_cities.is_empty() {
            anyhow::bail!("TRACKED_CITIES must name at least one city");
        }

        let config = Config {
            weather_api_key,
            weather_base_url: lookup("WEATHER_API_BASE_URL")
                .unwrap_or_else(|| "https://api.weatherapi.com/v1".to_string()),
            use_mock_origin,
            tracked_cities,
            default_forecast_days: parse_or(&lookup, "DEFAULT_FORECAST_DAYS", 3)?,
            current_ttl_minutes: parse_or(&lookup, "CURRENT_TTL_MINUTES", 15)?,
            forecast_ttl_minutes: parse_or(&lookup, "FORECAST_TTL_MINUTES", 60)?,
            fallback_ttl_minutes: parse_or(&lookup, "FALLBACK_TTL_MINUTES", 1)?,
            cache_max_capacity: parse_or(&lookup, "CACHE_MAX_CAPACITY", 10_000)?,
            redis_url: lookup("REDIS_URL")
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            http_timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30)?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.default_forecast_days == 0
            || self.default_forecast_days > crate::weather::MAX_FORECAST_DAYS
        {
            anyhow::bail!(
                "DEFAULT_FORECAST_DAYS must be between 1 and {}",
                crate::weather::MAX_FORECAST_DAYS
            );
        }
        for (name, value) in [
            ("CURRENT_TTL_MINUTES", self.current_ttl_minutes),
            ("FORECAST_TTL_MINUTES", self.forecast_ttl_minutes),
            ("FALLBACK_TTL_MINUTES", self.fallback_ttl_minutes),
            ("CACHE_MAX_CAPACITY", self.cache_max_capacity),
            ("HTTP_TIMEOUT_SECS", self.http_timeout_secs),
        ] {
            if value == 0 {
                anyhow::bail!("{} must be greater than zero", name);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            weather_api_key: "test-key".to_string(),
            weather_base_url: "http://localhost".to_string(),
            use_mock_origin: true,
            tracked_cities: vec!["Gliwice".to_string(), "Hamburg".to_string()],
            default_forecast_days: 3,
            current_ttl_minutes: 15,
            forecast_ttl_minutes: 60,
            fallback_ttl_minutes: 1,
            cache_max_capacity: 1_000,
            redis_url: None,
            http_timeout_secs: 5,
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", name, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("WEATHER_API_KEY", "abc")]).unwrap();

        assert_eq!(config.weather_api_key, "abc");
        assert_eq!(config.weather_base_url, "https://api.weatherapi.com/v1");
        assert!(!config.use_mock_origin);
        assert_eq!(config.tracked_cities, vec!["Gliwice", "Hamburg"]);
        assert_eq!(config.default_forecast_days, 3);
        assert_eq!(config.current_ttl_minutes, 15);
        assert_eq!(config.forecast_ttl_minutes, 60);
        assert_eq!(config.fallback_ttl_minutes, 1);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.redis_url, None);
    }

    #[test]
    fn test_redis_url_selects_shared_store() {
        let config = config_from(&[
            ("WEATHER_API_KEY", "abc"),
            ("REDIS_URL", " redis://cache:6379/0 "),
        ])
        .unwrap();
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379/0"));

        let config = config_from(&[("WEATHER_API_KEY", "abc"), ("REDIS_URL", "")]).unwrap();
        assert_eq!(config.redis_url, None);
    }

    #[test]
    fn test_api_key_required_unless_mock() {
        assert!(config_from(&[]).is_err());

        let config = config_from(&[("WEATHER_MOCK", "true")]).unwrap();
        assert!(config.use_mock_origin);
        assert!(config.weather_api_key.is_empty());
    }

    #[test]
    fn test_tracked_cities_are_trimmed() {
        let config = config_from(&[
            ("WEATHER_API_KEY", "abc"),
            ("TRACKED_CITIES", " Gliwice , Hamburg,,Kraków "),
        ])
        .unwrap();
        assert_eq!(config.tracked_cities, vec!["Gliwice", "Hamburg", "Kraków"]);

        assert!(config_from(&[("WEATHER_API_KEY", "abc"), ("TRACKED_CITIES", " , ")]).is_err());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(config_from(&[("WEATHER_API_KEY", "abc"), ("FORECAST_TTL_MINUTES", "soon")]).is_err());
        assert!(config_from(&[("WEATHER_API_KEY", "abc"), ("CURRENT_TTL_MINUTES", "0")]).is_err());
        assert!(config_from(&[("WEATHER_API_KEY", "abc"), ("DEFAULT_FORECAST_DAYS", "15")]).is_err());
    }
}
