use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::{config::Location, error::FallbackReason};

use super::{CurrentConditions, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: Option<String>,
    location: Location,
    base_url: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: Option<String>, location: Location) -> reqwest::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            api_key,
            location,
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        })
    }

    /// Point the source at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn fetch_current(&self) -> Result<CurrentConditions, FallbackReason> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(FallbackReason::CredentialsMissing)?;

        let url = format!("{}/data/2.5/weather", self.base_url);
        let lat = self.location.latitude.to_string();
        let lon = self.location.longitude.to_string();

        tracing::debug!(
            location = %self.location.name,
            key_prefix = %key_prefix(api_key),
            "Requesting current conditions from OpenWeather"
        );

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key),
                ("units", "imperial"),
            ])
            .send()
            .await
            .map_err(|e| FallbackReason::Transport(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FallbackReason::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(%status, body = %truncate_body(&body), "OpenWeather rejected request");
            return Err(FallbackReason::UpstreamStatus(status.as_u16()));
        }

        serde_json::from_str(&body).map_err(|e| FallbackReason::Malformed(e.to_string()))
    }
}

fn key_prefix(api_key: &str) -> String {
    let prefix: String = api_key.chars().take(3).collect();
    format!("{prefix}...")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
