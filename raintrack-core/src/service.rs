use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    error::StorageError,
    model::{RainStatus, Reading, RefreshReport},
    normalize::normalize,
    provider::WeatherSource,
    state::RainDayState,
    storage::{KeyValueStore, RainDayStore},
    tracker::advance,
};

/// Public entry point: fetch, normalize, advance and persist.
///
/// Only [`RainService::refresh`] and the methods built on it read the clock;
/// [`RainService::record`] takes the calendar day explicitly.
#[derive(Debug)]
pub struct RainService {
    source: Arc<dyn WeatherSource>,
    store: RainDayStore,
    /// Last state successfully loaded or saved. Also serializes
    /// load-advance-save between overlapping cycles.
    best_known: Mutex<RainDayState>,
}

impl RainService {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        store: Arc<dyn KeyValueStore>,
        location_id: &str,
    ) -> Self {
        Self {
            source,
            store: RainDayStore::new(store, location_id),
            best_known: Mutex::new(RainDayState::default()),
        }
    }

    pub async fn get_current_weather(&self) -> Reading {
        let outcome = self.source.fetch_current().await;
        normalize(outcome, Utc::now())
    }

    pub async fn check_rain_status(&self) -> RainStatus {
        self.refresh().await.status
    }

    /// One full cycle; the same reading feeds both the weather and the counter display.
    pub async fn refresh(&self) -> RefreshReport {
        let reading = self.get_current_weather().await;
        let today = reading.data().observed_at.date_naive();
        let status = self.record(&reading, today);

        RefreshReport { reading, status }
    }

    /// Apply `reading` to the persisted state for `today`.
    ///
    /// Storage failures leave the record untouched and report the best-known
    /// counter with `is_raining = false`.
    pub fn record(&self, reading: &Reading, today: NaiveDate) -> RainStatus {
        let mut best_known = self.best_known.lock();

        let prior = match self.store.load() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, key = self.store.key(), "Failed to load rain-day state");
                return degraded(&best_known, reading, &e);
            }
        };
        *best_known = prior;

        let step = advance(reading.data(), &prior, today);

        if step.changed(&prior) {
            if let Err(e) = self.store.save(&step.next) {
                tracing::warn!(error = %e, key = self.store.key(), "Failed to save rain-day state");
                return degraded(&prior, reading, &e);
            }
            tracing::info!(
                %today,
                days_since_rain = step.next.days_since_rain,
                raining = step.facts.is_raining_now,
                "Rain-day counter updated"
            );
        } else {
            tracing::debug!(%today, "Rain-day counter already current");
        }
        *best_known = step.next;

        RainStatus {
            is_raining: step.facts.is_raining_now,
            last_rain_date: step.facts.last_rain_date,
            days_since_rain: step.facts.days_since_rain,
            is_fallback: reading.is_fallback(),
            warning: reading.warning(),
            error: None,
        }
    }
}

fn degraded(state: &RainDayState, reading: &Reading, error: &StorageError) -> RainStatus {
    RainStatus {
        is_raining: false,
        last_rain_date: state.last_rain_date,
        days_since_rain: state.days_since_rain,
        is_fallback: reading.is_fallback(),
        warning: reading.warning(),
        error: Some(error.to_string()),
    }
}
