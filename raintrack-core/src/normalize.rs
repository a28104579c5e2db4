//! Turns a raw provider payload (or the reason there is none) into a
//! canonical [`Reading`]. This path never fails.

use chrono::{DateTime, Utc};

use crate::{
    error::FallbackReason,
    model::{Reading, Trend, WeatherReading},
    provider::CurrentConditions,
};

const FALLBACK_TEMPERATURE_F: f64 = 65.0;
const FALLBACK_CONDITION: &str = "Clouds";
const FALLBACK_DESCRIPTION: &str = "partly cloudy";
const FALLBACK_HUMIDITY_PCT: u8 = 65;
const FALLBACK_WIND_SPEED_MPH: f64 = 5.2;

/// Statically defined substitute used whenever the upstream source fails.
pub fn fallback_reading(observed_at: DateTime<Utc>) -> WeatherReading {
    WeatherReading {
        temperature_f: FALLBACK_TEMPERATURE_F,
        feels_like_f: None,
        condition: FALLBACK_CONDITION.to_string(),
        description: FALLBACK_DESCRIPTION.to_string(),
        humidity_pct: FALLBACK_HUMIDITY_PCT,
        wind_speed_mph: FALLBACK_WIND_SPEED_MPH,
        trend: Trend::Stable,
        observed_at,
    }
}

pub fn normalize(
    outcome: Result<CurrentConditions, FallbackReason>,
    observed_at: DateTime<Utc>,
) -> Reading {
    match outcome.and_then(|payload| map_payload(payload, observed_at)) {
        Ok(data) => Reading::Ok(data),
        Err(reason) => {
            match &reason {
                FallbackReason::CredentialsMissing => {
                    tracing::error!("OpenWeather API key is not configured")
                }
                FallbackReason::UpstreamStatus(status) => {
                    tracing::error!(status, "Weather API returned a non-success status")
                }
                FallbackReason::Transport(message) => {
                    tracing::error!(%message, "Weather API request failed")
                }
                FallbackReason::Malformed(message) => {
                    tracing::error!(%message, "Weather API response could not be used")
                }
            }

            Reading::Fallback {
                data: fallback_reading(observed_at),
                reason,
            }
        }
    }
}

fn map_payload(
    payload: CurrentConditions,
    observed_at: DateTime<Utc>,
) -> Result<WeatherReading, FallbackReason> {
    let CurrentConditions { main, weather, wind } = payload;

    let summary = weather
        .into_iter()
        .next()
        .ok_or_else(|| FallbackReason::Malformed("no weather entry".to_string()))?;

    if !main.temp.is_finite() {
        return Err(FallbackReason::Malformed(format!("temperature {}", main.temp)));
    }
    let feels_like_f = main.feels_like.filter(|f| f.is_finite());
    if main.humidity > 100 {
        return Err(FallbackReason::Malformed(format!("humidity {}%", main.humidity)));
    }
    if !wind.speed.is_finite() || wind.speed < 0.0 {
        return Err(FallbackReason::Malformed(format!("wind speed {}", wind.speed)));
    }

    Ok(WeatherReading {
        temperature_f: main.temp,
        feels_like_f,
        condition: summary.main,
        description: summary.description,
        humidity_pct: main.humidity,
        wind_speed_mph: wind.speed,
        trend: Trend::from_temperatures(main.temp, feels_like_f),
        observed_at,
    })
}
