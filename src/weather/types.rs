use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub localtime_epoch: i64,
    pub localtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    #[serde(rename = "feelslike_c")]
    pub feels_like_c: f64,
    pub condition: Condition,
    pub wind_kph: f64,
    pub humidity: f64,
}

/// Response of the provider's `/current.json` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherResponse {
    pub location: Location,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    #[serde(rename = "maxtemp_c")]
    pub max_temp_c: f64,
    #[serde(rename = "mintemp_c")]
    pub min_temp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub day: DaySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Ordered by date ascending, index 0 is the first requested day.
    #[serde(rename = "forecastday")]
    pub forecast_days: Vec<ForecastDay>,
}

/// Response of the provider's `/forecast.json` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastWeatherResponse {
    pub location: Location,
    pub forecast: Forecast,
}

impl ForecastWeatherResponse {
    pub fn day_count(&self) -> usize {
        self.forecast.forecast_days.len()
    }

    /// Keep only the first `days` entries. Everything else is left untouched.
    pub fn truncate_days(&mut self, days: usize) {
        self.forecast.forecast_days.truncate(days);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORECAST_JSON: &str = r#"{
        "location": {
            "name": "Gliwice",
            "region": "",
            "country": "Poland",
            "lat": 50.28,
            "localtime_epoch": 1760515200,
            "localtime": "2025-10-15 10:00"
        },
        "forecast": {
            "forecastday": [
                {"date": "2025-10-15", "date_epoch": 1760486400,
                 "day": {"maxtemp_c": 14.1, "mintemp_c": 6.3,
                         "condition": {"text": "Sunny", "icon": "//cdn/113.png", "code": 1000}}},
                {"date": "2025-10-16",
                 "day": {"maxtemp_c": 12.0, "mintemp_c": 5.0,
                         "condition": {"text": "Light rain", "icon": "//cdn/296.png", "code": 1183}}}
            ]
        }
    }"#;

    #[test]
    fn test_forecast_deserializes_provider_shape() {
        let forecast: ForecastWeatherResponse = serde_json::from_str(FORECAST_JSON).unwrap();

        assert_eq!(forecast.location.name, "Gliwice");
        assert_eq!(forecast.location.localtime_epoch, 1760515200);
        assert_eq!(forecast.day_count(), 2);
        assert_eq!(forecast.forecast.forecast_days[1].day.condition.code, 1183);
        assert_eq!(forecast.forecast.forecast_days[0].day.max_temp_c, 14.1);
    }

    #[test]
    fn test_truncate_days_keeps_prefix() {
        let mut forecast: ForecastWeatherResponse = serde_json::from_str(FORECAST_JSON).unwrap();
        let location = forecast.location.clone();

        forecast.truncate_days(1);

        assert_eq!(forecast.day_count(), 1);
        assert_eq!(forecast.forecast.forecast_days[0].date, "2025-10-15");
        assert_eq!(forecast.location, location);
    }

    #[test]
    fn test_current_serializes_with_provider_field_names() {
        let json = r#"{
            "location": {"name": "Hamburg", "region": "Hamburg", "country": "Germany",
                         "localtime_epoch": 1760515200, "localtime": "2025-10-15 10:00"},
            "current": {"temp_c": 11.0, "feelslike_c": 9.5, "wind_kph": 18.4, "humidity": 82,
                        "condition": {"text": "Overcast", "icon": "//cdn/122.png", "code": 1009}}
        }"#;
        let current: CurrentWeatherResponse = serde_json::from_str(json).unwrap();
        assert_eq!(current.current.feels_like_c, 9.5);

        let value = serde_json::to_value(&current).unwrap();
        assert_eq!(value["current"]["feelslike_c"], 9.5);
        assert_eq!(value["location"]["localtime_epoch"], 1760515200);
    }
}
