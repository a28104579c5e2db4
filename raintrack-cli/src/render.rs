//! Human-readable output.

use chrono::{DateTime, Utc};
use raintrack_core::{
    RainStatus, Reading, RefreshReport,
    display::{
        ConditionIcon, FALLBACK_NOTICE, counter_caption, time_ago, trend_arrow, trend_label,
    },
};
use std::fmt::Write;

pub fn weather(reading: &Reading, now: DateTime<Utc>) -> String {
    let data = reading.data();
    let mut out = String::new();

    if let Some(warning) = reading.warning() {
        let _ = writeln!(out, "! {warning}");
    }

    let icon = ConditionIcon::from_condition(&data.condition);
    let _ = writeln!(
        out,
        "{} {:.0}°F  {}",
        icon.symbol(),
        data.temperature_f.round(),
        data.description
    );
    let _ = writeln!(out, "{} {}", trend_arrow(data.trend), trend_label(data.trend));
    let _ = writeln!(
        out,
        "Humidity {}%  Wind {} mph",
        data.humidity_pct, data.wind_speed_mph
    );
    if reading.is_fallback() {
        let _ = writeln!(out, "{FALLBACK_NOTICE}");
    }
    let _ = write!(out, "Data last updated: {}", time_ago(data.observed_at, now));

    out
}

pub fn status(status: &RainStatus) -> String {
    let mut out = String::new();

    if let Some(warning) = &status.warning {
        let _ = writeln!(out, "! {warning}");
    }
    if let Some(error) = &status.error {
        let _ = writeln!(out, "! {error}");
    }
    if status.is_raining {
        let _ = writeln!(out, "It's raining now!");
    }

    let _ = writeln!(out, "[ {} ]", status.days_since_rain);
    let _ = write!(out, "{}", counter_caption(status));

    if let Some(date) = status.last_rain_date {
        let _ = write!(out, "\nLast rain: {date}");
    }
    if status.is_fallback {
        let _ = write!(out, "\n{FALLBACK_NOTICE}");
    }

    out
}

pub fn report(report: &RefreshReport, now: DateTime<Utc>) -> String {
    format!(
        "{}\n\n{}\n",
        status(&report.status),
        weather(&report.reading, now)
    )
}
