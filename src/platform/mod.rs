//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Calendar day (daily challenges, streaks)
//! - Storage (LocalStorage on web, see `persistence`)

use std::cell::Cell;

use chrono::{Days, NaiveDate};

/// Day stamp format used in persisted state
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Source of the player's current calendar day
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    #[cfg(target_arch = "wasm32")]
    fn today(&self) -> NaiveDate {
        let now = js_sys::Date::new_0();
        NaiveDate::from_ymd_opt(
            now.get_full_year() as i32,
            now.get_month() + 1,
            now.get_date(),
        )
        .unwrap_or_default()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug, Clone)]
pub struct FixedClock {
    day: Cell<NaiveDate>,
}

impl FixedClock {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: Cell::new(day),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        self.day.set(day);
    }

    /// Move the clock forward by whole days
    pub fn advance_days(&self, days: u64) {
        let current = self.day.get();
        self.day
            .set(current.checked_add_days(Days::new(days)).unwrap_or(current));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.day.get()
    }
}

/// Format a day as its persisted stamp
pub fn day_stamp(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a persisted day stamp
pub fn parse_day_stamp(stamp: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(stamp.trim(), DAY_FORMAT).ok()
}
