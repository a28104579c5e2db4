//! Days-since-rain state machine.
//!
//! [`advance`] is a pure function of the reading's condition, the prior
//! state and the calendar day. Decisions are keyed off date equality against
//! the persisted state, so repeating a call on the same day is a no-op.

use chrono::NaiveDate;

use crate::{
    model::{RainFacts, WeatherReading},
    state::RainDayState,
};

/// Outcome of one tracker step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub next: RainDayState,
    pub facts: RainFacts,
}

impl Advance {
    pub fn changed(&self, prior: &RainDayState) -> bool {
        self.next != *prior
    }
}

pub fn advance(reading: &WeatherReading, prior: &RainDayState, today: NaiveDate) -> Advance {
    let raining = reading.indicates_rain();
    let rain_recorded_today = prior.last_rain_date == Some(today);

    let next = if raining && !rain_recorded_today {
        // Rain resets immediately, even if today was already counted as dry.
        RainDayState {
            last_rain_date: Some(today),
            days_since_rain: 0,
            last_checked_date: Some(today),
        }
    } else if !raining && !rain_recorded_today && prior.last_checked_date != Some(today) {
        RainDayState {
            last_rain_date: prior.last_rain_date,
            days_since_rain: prior.days_since_rain.saturating_add(1),
            last_checked_date: Some(today),
        }
    } else {
        *prior
    };

    Advance {
        next,
        facts: RainFacts {
            is_raining_now: raining,
            days_since_rain: next.days_since_rain,
            last_rain_date: next.last_rain_date,
        },
    }
}
