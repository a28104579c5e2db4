//! Text shown alongside the counter and the current conditions.

use chrono::{DateTime, Utc};

use crate::model::{RainStatus, Trend};

pub const FALLBACK_NOTICE: &str =
    "Using fallback weather data. Some information may not be accurate.";

/// Coarse icon category for a condition token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionIcon {
    Rain,
    Clear,
    Cloud,
}

impl ConditionIcon {
    pub fn from_condition(condition: &str) -> Self {
        let condition = condition.to_lowercase();
        if condition.contains("rain") || condition.contains("drizzle") {
            ConditionIcon::Rain
        } else if condition.contains("clear") || condition.contains("sun") {
            ConditionIcon::Clear
        } else {
            ConditionIcon::Cloud
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ConditionIcon::Rain => "🌧",
            ConditionIcon::Clear => "☀",
            ConditionIcon::Cloud => "☁",
        }
    }
}

pub fn counter_caption(status: &RainStatus) -> String {
    if status.is_raining {
        return "Counter will reset at midnight".to_string();
    }
    match status.days_since_rain {
        0 => "It rained today".to_string(),
        1 => "1 day since last rain".to_string(),
        n => format!("{n} days since last rain"),
    }
}

pub fn trend_label(trend: Trend) -> &'static str {
    match trend {
        Trend::Rising => "Temperature rising",
        Trend::Falling => "Temperature falling",
        Trend::Stable => "Temperature stable",
    }
}

pub fn trend_arrow(trend: Trend) -> &'static str {
    match trend {
        Trend::Rising => "↑",
        Trend::Falling => "↓",
        Trend::Stable => "–",
    }
}

/// Relative age such as "5 minutes ago" or "about 2 hours ago".
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let minutes = (secs + 30) / 60;

    match minutes {
        0 => "less than a minute ago".to_string(),
        1 => "1 minute ago".to_string(),
        2..=44 => format!("{minutes} minutes ago"),
        45..=89 => "about 1 hour ago".to_string(),
        90..=1439 => format!("about {} hours ago", (minutes + 30) / 60),
        1440..=2519 => "1 day ago".to_string(),
        _ => format!("{} days ago", (minutes + 720) / 1440),
    }
}
