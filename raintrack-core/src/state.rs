use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted rain-day counter for one location.
///
/// Dates are UTC calendar days and serialize as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainDayState {
    /// Most recent day rain was observed; `None` means never.
    #[serde(default)]
    pub last_rain_date: Option<NaiveDate>,
    #[serde(default)]
    pub days_since_rain: u32,
    /// Last day the counter was evaluated on the dry path.
    #[serde(default)]
    pub last_checked_date: Option<NaiveDate>,
}

impl RainDayState {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a stored record. Returns `None` for anything that does not
    /// decode cleanly or breaks the counter's invariants, so a bad record is
    /// never trusted.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<RainDayState>(raw) {
            Ok(state) if state.is_consistent() => Some(state),
            Ok(state) => {
                tracing::warn!(?state, "Discarding inconsistent rain-day record");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable rain-day record");
                None
            }
        }
    }

    /// A rain day is never checked before the rain itself, and the counter
    /// is zero on a day that was both.
    pub fn is_consistent(&self) -> bool {
        match (self.last_rain_date, self.last_checked_date) {
            (Some(rain), Some(checked)) if checked < rain => false,
            (Some(rain), Some(checked)) if checked == rain => self.days_since_rain == 0,
            _ => true,
        }
    }
}
