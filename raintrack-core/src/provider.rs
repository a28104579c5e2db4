use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

use crate::error::FallbackReason;

pub mod openweather;

pub use openweather::OpenWeatherSource;

/// Raw current-conditions payload in the provider's own shape.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub main: MainBlock,
    pub weather: Vec<ConditionSummary>,
    pub wind: WindBlock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionSummary {
    pub main: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindBlock {
    pub speed: f64,
}

/// Single-shot access to the current conditions at the tracked location.
///
/// Implementations make one attempt and report failure as a [`FallbackReason`];
/// recovery is up to the normalizer.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(&self) -> Result<CurrentConditions, FallbackReason>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_provider_shape() {
        let body = r#"{
            "main": { "temp": 85.0, "feels_like": 87.0, "humidity": 30, "pressure": 1012 },
            "weather": [{ "id": 800, "main": "Clear", "description": "clear sky" }],
            "wind": { "speed": 5.2, "deg": 200 },
            "name": "Armonk"
        }"#;

        let parsed: CurrentConditions = serde_json::from_str(body).expect("valid payload");
        assert_eq!(parsed.main.temp, 85.0);
        assert_eq!(parsed.main.feels_like, Some(87.0));
        assert_eq!(parsed.weather[0].main, "Clear");
        assert_eq!(parsed.wind.speed, 5.2);
    }

    #[test]
    fn feels_like_is_optional() {
        let body = r#"{
            "main": { "temp": 60.0, "humidity": 80 },
            "weather": [{ "main": "Rain", "description": "light rain" }],
            "wind": { "speed": 0.0 }
        }"#;

        let parsed: CurrentConditions = serde_json::from_str(body).expect("valid payload");
        assert_eq!(parsed.main.feels_like, None);
    }

    #[test]
    fn rejects_missing_blocks() {
        let body = r#"{ "main": { "temp": 60.0, "humidity": 80 } }"#;
        assert!(serde_json::from_str::<CurrentConditions>(body).is_err());
    }
}
