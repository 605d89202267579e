use crate::weather::{CURRENT_PATH, FORECAST_PATH};

/// `path?k1=v1&k2=v2`, with parameters in the order given. Order is part of
/// the key and is never sorted.
pub fn build_cache_key(path: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

pub fn current_key(city: &str) -> String {
    build_cache_key(CURRENT_PATH, &[("q", city)])
}

pub fn forecast_key(city: &str, days: u32) -> String {
    build_cache_key(FORECAST_PATH, &[("q", city), ("days", &days.to_string())])
}

/// Key of the largest forecast window fetched for `city`.
pub fn max_days_key(city: &str) -> String {
    format!("{}:maxDays", city)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cache_key_preserves_order() {
        assert_eq!(build_cache_key("p", &[("a", "1"), ("b", "2")]), "p?a=1&b=2");
        assert_eq!(build_cache_key("p", &[("b", "2"), ("a", "1")]), "p?b=2&a=1");
    }

    #[test]
    fn test_build_cache_key_is_deterministic() {
        let params = [("q", "Gliwice"), ("days", "5")];
        let first = build_cache_key("/forecast.json", &params);
        for _ in 0..10 {
            assert_eq!(build_cache_key("/forecast.json", &params), first);
        }
    }

    #[test]
    fn test_build_cache_key_without_params() {
        assert_eq!(build_cache_key("/current.json", &[]), "/current.json?");
    }

    #[test]
    fn test_kind_specific_keys() {
        assert_eq!(current_key("Hamburg"), "/current.json?q=Hamburg");
        assert_eq!(forecast_key("Gliwice", 5), "/forecast.json?q=Gliwice&days=5");
        assert_eq!(max_days_key("Gliwice"), "Gliwice:maxDays");
    }

    #[test]
    fn test_current_and_forecast_keys_never_collide() {
        assert_ne!(current_key("Gliwice"), forecast_key("Gliwice", 1));
        assert!(!current_key("Gliwice").starts_with(FORECAST_PATH));
    }
}
