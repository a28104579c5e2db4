use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FallbackReason;

/// Momentary felt-vs-actual temperature classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// `feels_like > temp` is rising, `<` is falling, anything else is stable.
    pub fn from_temperatures(temperature_f: f64, feels_like_f: Option<f64>) -> Self {
        match feels_like_f {
            Some(feels) if feels > temperature_f => Trend::Rising,
            Some(feels) if feels < temperature_f => Trend::Falling,
            _ => Trend::Stable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical weather snapshot. Always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_f: f64,
    pub feels_like_f: Option<f64>,
    /// Coarse category token, e.g. "Rain", "Clear", "Clouds".
    pub condition: String,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_mph: f64,
    pub trend: Trend,
    pub observed_at: DateTime<Utc>,
}

impl WeatherReading {
    /// Case-insensitive check for "rain" or "drizzle" in the condition token.
    pub fn indicates_rain(&self) -> bool {
        let condition = self.condition.to_lowercase();
        condition.contains("rain") || condition.contains("drizzle")
    }
}

/// A reading tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Ok(WeatherReading),
    Fallback {
        data: WeatherReading,
        reason: FallbackReason,
    },
}

impl Reading {
    pub fn data(&self) -> &WeatherReading {
        match self {
            Reading::Ok(data) | Reading::Fallback { data, .. } => data,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Reading::Fallback { .. })
    }

    /// Non-fatal note to surface next to fallback values.
    pub fn warning(&self) -> Option<String> {
        match self {
            Reading::Ok(_) => None,
            Reading::Fallback { reason, .. } => Some(reason.to_string()),
        }
    }

    pub fn snapshot(&self) -> ReadingSnapshot {
        ReadingSnapshot {
            data: self.data().clone(),
            is_fallback: self.is_fallback(),
            warning: self.warning(),
        }
    }
}

/// Flat serializable view of a [`Reading`], for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingSnapshot {
    #[serde(flatten)]
    pub data: WeatherReading,
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Display values derived by a tracker step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RainFacts {
    pub is_raining_now: bool,
    pub days_since_rain: u32,
    pub last_rain_date: Option<NaiveDate>,
}

/// Result of one rain check, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RainStatus {
    pub is_raining: bool,
    pub last_rain_date: Option<NaiveDate>,
    pub days_since_rain: u32,
    pub is_fallback: bool,
    /// Set when the reading is fallback data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Set when persisted state could not be read or written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One refresh cycle: the reading that was fetched and the rain status it produced.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub reading: Reading,
    pub status: RainStatus,
}
